use super::api::FacadeApi;
use super::auth::IdentityProvider;
use crate::error::{AppError, Result};
use crate::google::{GOOGLE_AUTH_URL, TokenGrant};
use async_trait::async_trait;
use oauth2::{
    AuthUrl, ClientId, CsrfToken, PkceCodeChallenge, RedirectUrl, Scope, basic::BasicClient,
};
use tiny_http::{Response, Server};
use tracing::{debug, info, instrument};
use url::Url;

const GOOGLE_REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";
const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.readonly",
    "https://www.googleapis.com/auth/spreadsheets.readonly",
];

/// Google consent flow over a loopback redirect, with the code exchanged by the facade.
pub struct GoogleIdentity<A> {
    api: A,
    http_client: reqwest::Client,
}

impl<A: FacadeApi> GoogleIdentity<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl<A: FacadeApi> IdentityProvider for GoogleIdentity<A> {
    #[instrument(name = "Signing in with Google", skip_all)]
    async fn request_access_token(&self) -> Result<TokenGrant> {
        let settings = self.api.client_settings().await?;

        let redirect_url = Url::parse(&settings.redirect_uri)
            .map_err(|e| AppError::Config(format!("Invalid redirect URI: {}", e)))?;
        let client = BasicClient::new(ClientId::new(settings.client_id))
            .set_auth_uri(
                AuthUrl::new(GOOGLE_AUTH_URL.to_string())
                    .map_err(|e| AppError::Auth(format!("Invalid auth URL: {}", e)))?,
            )
            .set_redirect_uri(RedirectUrl::from_url(redirect_url.clone()));

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .set_pkce_challenge(pkce_challenge)
            .add_extra_param("prompt", "consent")
            .url();

        let bind_addr = callback_bind_addr(&redirect_url)?;
        let server = Server::http(&bind_addr)
            .map_err(|e| AppError::Auth(format!("Failed to bind to {}: {}", bind_addr, e)))?;

        println!("Open this URL in your browser:\n{}", auth_url);
        println!();
        println!("Waiting for authorization...");

        let expected_state = csrf_token.secret().clone();
        let code = tokio::task::spawn_blocking(move || {
            wait_for_callback(&server, &redirect_url, &expected_state)
        })
        .await
        .map_err(|e| AppError::Other(e.into()))??;

        debug!("Received authorization code");
        self.api
            .exchange_code(&code, pkce_verifier.secret())
            .await
    }

    #[instrument(name = "Revoking Google access token", skip_all)]
    async fn revoke(&self, access_token: &str) -> Result<()> {
        let response = self
            .http_client
            .post(GOOGLE_REVOKE_URL)
            .query(&[("token", access_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Failed to revoke token: {} - {}",
                status, body
            )));
        }

        info!("Access token revoked");
        Ok(())
    }
}

fn callback_bind_addr(redirect_url: &Url) -> Result<String> {
    let host = redirect_url
        .host_str()
        .ok_or_else(|| AppError::Config("Redirect URI has no host".to_string()))?;
    let port = redirect_url
        .port_or_known_default()
        .ok_or_else(|| AppError::Config("Redirect URI has no port".to_string()))?;

    Ok(format!("{}:{}", host, port))
}

/// Block until the browser hits the redirect path, then answer it
fn wait_for_callback(server: &Server, redirect_url: &Url, expected_state: &str) -> Result<String> {
    loop {
        let request = server
            .recv()
            .map_err(|e| AppError::Auth(format!("Failed to receive request: {}", e)))?;

        let callback_url = redirect_url
            .join(request.url())
            .map_err(|e| AppError::Auth(format!("Failed to parse callback URL: {}", e)))?;

        if callback_url.path() != redirect_url.path() {
            if let Err(e) =
                request.respond(Response::from_string("Not found").with_status_code(404))
            {
                debug!(error = %e, "Failed to answer stray request");
            }
            continue;
        }

        let result = parse_callback(&callback_url, expected_state);
        let message = match &result {
            Ok(_) => "Authentication successful! You can close this window.".to_string(),
            Err(e) => format!("Authentication failed: {}", e),
        };
        request
            .respond(Response::from_string(message))
            .map_err(|e| AppError::Auth(format!("Failed to send response: {}", e)))?;

        return result;
    }
}

fn parse_callback(url: &Url, expected_state: &str) -> Result<String> {
    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if let Some(error) = param("error") {
        return Err(AppError::Auth(error));
    }

    let state = param("state").ok_or_else(|| AppError::Auth("No state in callback".to_string()))?;
    if state != expected_state {
        return Err(AppError::Auth("CSRF token mismatch".to_string()));
    }

    param("code").ok_or_else(|| AppError::Auth("No code in callback".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback(query: &str) -> Url {
        Url::parse(&format!("http://127.0.0.1:8085/callback?{}", query)).unwrap()
    }

    #[test]
    fn test_parse_callback_code() {
        let code = parse_callback(&callback("state=abc&code=4%2F0Ab&scope=x"), "abc").unwrap();

        assert_eq!(code, "4/0Ab");
    }

    #[test]
    fn test_parse_callback_csrf_mismatch() {
        let result = parse_callback(&callback("state=other&code=c"), "abc");

        match result {
            Err(AppError::Auth(message)) => assert_eq!(message, "CSRF token mismatch"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_callback_provider_error() {
        let result = parse_callback(&callback("error=access_denied&state=abc"), "abc");

        match result {
            Err(AppError::Auth(message)) => assert_eq!(message, "access_denied"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_callback_bind_addr() {
        let url = Url::parse("http://localhost:8085/callback").unwrap();
        assert_eq!(callback_bind_addr(&url).unwrap(), "localhost:8085");

        let url = Url::parse("http://localhost/callback").unwrap();
        assert_eq!(callback_bind_addr(&url).unwrap(), "localhost:80");
    }
}
