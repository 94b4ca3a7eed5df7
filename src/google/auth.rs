use super::{AuthenticatedHandle, TokenVerifier};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Browsers serialize missing values into these literals
pub fn is_absent_token(token: Option<&str>) -> bool {
    match token {
        None => true,
        Some(token) => token.is_empty() || token == "undefined" || token == "null",
    }
}

// https://developers.google.com/identity/protocols/oauth2/native-app#tokeninfo
#[derive(Debug, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    aud: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfoError {
    error: Option<String>,
    error_description: Option<String>,
}

/// Verifies access tokens against Google's token-info endpoint.
pub struct TokenInfoVerifier {
    client: Client,
    tokeninfo_url: String,
}

impl TokenInfoVerifier {
    pub fn new(tokeninfo_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            tokeninfo_url: tokeninfo_url.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for TokenInfoVerifier {
    #[instrument(name = "Verifying access token", skip_all)]
    async fn verify(&self, access_token: Option<&str>) -> Result<AuthenticatedHandle> {
        let access_token = match access_token {
            Some(token) if !is_absent_token(Some(token)) => token,
            _ => return Err(AppError::MissingToken),
        };

        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| AppError::InvalidToken(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenInfoError>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or_else(|| format!("token info lookup returned {}", status));
            warn!(%status, "Token verification failed");
            return Err(AppError::InvalidToken(message));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| AppError::InvalidToken(e.to_string()))?;

        debug!(aud = ?info.aud, expires_in = ?info.expires_in, "Access token verified");

        let scopes = info
            .scope
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(AuthenticatedHandle::new(access_token, scopes))
    }
}
