use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Access token is required")]
    MissingToken,

    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error("{0}")]
    RemoteApi(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OAuth2 authentication error: {0}")]
    Auth(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("No access token available")]
    NotSignedIn,

    #[error("Authentication failed - please sign in again")]
    SignInRequired,

    // Error reported by the facade, message passed through as-is
    #[error("{message}")]
    Facade { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::MissingToken | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken(_) | AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        } else {
            tracing::debug!(error = %message, status = status.as_u16(), "Request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::MissingToken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidToken("expired".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::RemoteApi("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Config("no credentials".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sign_in_required_message() {
        assert_eq!(
            AppError::SignInRequired.to_string(),
            "Authentication failed - please sign in again"
        );
    }
}
