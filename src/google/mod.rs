mod auth;
mod drive;
mod exchange;
mod sheets;

pub use auth::{TokenInfoVerifier, is_absent_token};
pub use drive::DriveClient;
pub use exchange::{GOOGLE_AUTH_URL, OAuthCodeExchanger};
pub use sheets::{DEFAULT_RANGE, SheetsClient};

use crate::config::GoogleCredentials;
use crate::error::{AppError, Result};
use crate::models::{DriveFile, SheetData, SheetMetadata};
use async_trait::async_trait;
use google_apis_common::GetToken;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;

pub(crate) type HttpsClient = google_apis_common::Client<HttpsConnector<HttpConnector>>;

/// A verified access token, used to make downstream provider calls.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedHandle {
    access_token: String,
    scopes: Vec<String>,
}

impl AuthenticatedHandle {
    pub fn new(access_token: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            access_token: access_token.into(),
            scopes,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    fn bearer(&self) -> BearerToken {
        BearerToken(self.access_token().to_string())
    }
}

/// An access token granted by the consent flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, access_token: Option<&str>) -> Result<AuthenticatedHandle>;
}

#[async_trait]
pub trait DriveOperations: Send + Sync {
    async fn list_spreadsheets(&self, handle: &AuthenticatedHandle) -> Result<Vec<DriveFile>>;
}

#[async_trait]
pub trait SheetOperations: Send + Sync {
    async fn get_data(
        &self,
        handle: &AuthenticatedHandle,
        sheet_id: &str,
        range: &str,
    ) -> Result<SheetData>;

    async fn get_metadata(
        &self,
        handle: &AuthenticatedHandle,
        sheet_id: &str,
    ) -> Result<SheetMetadata>;
}

#[async_trait]
pub trait CodeExchanger: Send + Sync {
    async fn exchange(
        &self,
        credentials: &GoogleCredentials,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenGrant>;
}

/// Hands the caller's access token to the generated API hubs as-is.
#[derive(Clone)]
struct BearerToken(String);

impl GetToken for BearerToken {
    fn get_token<'a>(
        &'a self,
        _scopes: &'a [&str],
    ) -> Pin<
        Box<
            dyn Future<Output = std::result::Result<Option<String>, Box<dyn StdError + Send + Sync>>>
                + Send
                + 'a,
        >,
    > {
        Box::pin(async move { Ok(Some(self.0.clone())) })
    }
}

pub(crate) fn https_client() -> Result<HttpsClient> {
    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| AppError::Config(format!("Failed to load TLS roots: {}", e)))?
        .https_or_http()
        .enable_http1()
        .build();

    Ok(
        hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
            .build(connector),
    )
}

/// Prefer the provider's own error message over the generic error text
fn provider_message(error: &google_apis_common::Error) -> String {
    if let google_apis_common::Error::BadRequest(body) = error {
        if let Some(message) = body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
    }
    error.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_message_from_bad_request() {
        let error = google_apis_common::Error::BadRequest(json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED"
            }
        }));

        assert_eq!(
            provider_message(&error),
            "The caller does not have permission"
        );
    }

    #[test]
    fn test_provider_message_fallback() {
        let error = google_apis_common::Error::BadRequest(json!({"unexpected": true}));

        assert_eq!(provider_message(&error), error.to_string());
    }

    #[tokio::test]
    async fn test_bearer_token_ignores_scopes() {
        let token = BearerToken("ya29.token".to_string());

        let result = token.get_token(&["scope-a", "scope-b"]).await.unwrap();

        assert_eq!(result.as_deref(), Some("ya29.token"));
    }
}
