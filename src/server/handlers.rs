use super::AppState;
use super::schemas::{
    ClientSettings, CodeExchangeRequest, HealthResponse, SheetDataRequest, SheetDataResponse,
    SheetMetadataResponse, SpreadsheetsResponse, TokenRequest,
};
use crate::error::{AppError, Result};
use crate::google::{AuthenticatedHandle, DEFAULT_RANGE, TokenGrant, is_absent_token};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use tracing::debug;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Google Sheets Viewer API is running".to_string(),
    })
}

pub async fn config(State(state): State<AppState>) -> Result<Json<ClientSettings>> {
    let credentials = state.credentials()?;

    Ok(Json(ClientSettings {
        client_id: credentials.client_id.clone(),
        redirect_uri: credentials.redirect_uri.clone(),
    }))
}

/// A body sent without a JSON content type reads as empty, so the handler
/// reports the missing field instead of the extractor's plain-text rejection
fn json_body<T: Default>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}

/// Rejects absent tokens here so the verifier is never consulted for them
async fn authenticate(state: &AppState, access_token: Option<&str>) -> Result<AuthenticatedHandle> {
    if is_absent_token(access_token) {
        return Err(AppError::MissingToken);
    }
    let handle = state.verifier.verify(access_token).await?;
    debug!(scopes = ?handle.scopes(), "Request authenticated");
    Ok(handle)
}

pub async fn list_spreadsheets(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<SpreadsheetsResponse>> {
    let body = json_body(payload)?;
    let handle = authenticate(&state, body.access_token.as_deref()).await?;
    let spreadsheets = state.drive.list_spreadsheets(&handle).await?;

    Ok(Json(SpreadsheetsResponse { spreadsheets }))
}

pub async fn sheet_data(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    payload: std::result::Result<Json<SheetDataRequest>, JsonRejection>,
) -> Result<Json<SheetDataResponse>> {
    let body = json_body(payload)?;
    let handle = authenticate(&state, body.access_token.as_deref()).await?;
    let range = body
        .range
        .as_deref()
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_RANGE);
    let data = state.sheets.get_data(&handle, &file_id, range).await?;

    Ok(Json(SheetDataResponse { data }))
}

pub async fn sheet_metadata(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    payload: std::result::Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<SheetMetadataResponse>> {
    let body = json_body(payload)?;
    let handle = authenticate(&state, body.access_token.as_deref()).await?;
    let metadata = state.sheets.get_metadata(&handle, &file_id).await?;

    Ok(Json(SheetMetadataResponse { metadata }))
}

pub async fn exchange_code(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CodeExchangeRequest>, JsonRejection>,
) -> Result<Json<TokenGrant>> {
    let body = json_body(payload)?;
    let code = body
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Authorization code is required".to_string()))?;
    let code_verifier = body
        .code_verifier
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("Code verifier is required".to_string()))?;

    let credentials = state.credentials()?;
    let grant = state
        .exchanger
        .exchange(credentials, &code, &code_verifier)
        .await?;

    Ok(Json(grant))
}
