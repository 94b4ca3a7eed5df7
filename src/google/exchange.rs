use super::{CodeExchanger, TokenGrant};
use crate::config::GoogleCredentials;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, PkceCodeVerifier, RedirectUrl,
    RequestTokenError, TokenResponse, TokenUrl, basic::BasicClient,
};
use reqwest::redirect::Policy;
use tracing::{debug, instrument};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Exchanges authorization codes with Google using the server's client secret.
pub struct OAuthCodeExchanger {
    http_client: reqwest::Client,
}

impl OAuthCodeExchanger {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .redirect(Policy::none())
            .build()
            .map_err(|e| AppError::Auth(format!("Failed to build reqwest client: {}", e)))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl CodeExchanger for OAuthCodeExchanger {
    #[instrument(name = "Exchanging authorization code", skip_all)]
    async fn exchange(
        &self,
        credentials: &GoogleCredentials,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenGrant> {
        let client = BasicClient::new(ClientId::new(credentials.client_id.clone()))
            .set_client_secret(ClientSecret::new(credentials.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(GOOGLE_AUTH_URL.to_string())
                    .map_err(|e| AppError::Config(format!("Invalid auth URL: {}", e)))?,
            )
            .set_token_uri(
                TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
                    .map_err(|e| AppError::Config(format!("Invalid token URL: {}", e)))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(credentials.redirect_uri.clone())
                    .map_err(|e| AppError::Config(format!("Invalid redirect URL: {}", e)))?,
            );

        let token_result = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(code_verifier.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(response) => AppError::Auth(format!(
                    "Failed to exchange code: {}",
                    response
                        .error_description()
                        .cloned()
                        .unwrap_or_else(|| response.error().to_string())
                )),
                other => AppError::Auth(format!("Failed to exchange code: {:?}", other)),
            })?;

        let expires_in = token_result.expires_in().map(|d| d.as_secs());
        debug!(?expires_in, "Authorization code exchanged");

        Ok(TokenGrant {
            access_token: token_result.access_token().secret().clone(),
            expires_in,
        })
    }
}
