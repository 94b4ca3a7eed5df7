use super::store::AuthStore;
use crate::error::{AppError, Result};
use crate::google::TokenGrant;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_signed_in: bool,
    pub access_token: Option<String>,
}

impl AuthState {
    /// Accept a stored value only when it carries a token and a boolean sign-in flag
    pub fn from_stored(contents: &str) -> Option<Self> {
        let stored: Value = serde_json::from_str(contents).ok()?;

        let is_signed_in = stored.get("isSignedIn")?.as_bool()?;
        let access_token = stored
            .get("accessToken")?
            .as_str()
            .filter(|t| !t.is_empty())?;

        Some(Self {
            is_signed_in,
            access_token: Some(access_token.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    SignedOut,
    /// A sign-in is awaiting the provider, or was abandoned before it answered
    Loading,
    SignedIn,
}

/// The identity provider side of the consent flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Run the consent flow to completion
    async fn request_access_token(&self) -> Result<TokenGrant>;

    async fn revoke(&self, access_token: &str) -> Result<()>;
}

/// Owns the client's auth state and keeps the store in step with it.
pub struct AuthSession<P, S> {
    provider: P,
    store: S,
    state: AuthState,
    status: AuthStatus,
}

impl<P, S> AuthSession<P, S>
where
    P: IdentityProvider,
    S: AuthStore,
{
    pub fn new(provider: P, store: S) -> Self {
        let state = match store.load() {
            Ok(Some(contents)) => AuthState::from_stored(&contents).unwrap_or_else(|| {
                warn!("Stored auth state is invalid, starting signed out");
                AuthState::default()
            }),
            Ok(None) => AuthState::default(),
            Err(e) => {
                warn!(error = %e, "Failed to load auth state");
                AuthState::default()
            }
        };

        let status = match state.is_signed_in {
            true => AuthStatus::SignedIn,
            false => AuthStatus::SignedOut,
        };

        Self {
            provider,
            store,
            state,
            status,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn status(&self) -> AuthStatus {
        self.status
    }

    pub async fn sign_in(&mut self) -> Result<()> {
        self.status = AuthStatus::Loading;
        info!("Waiting for Google sign-in");

        match self.provider.request_access_token().await {
            Ok(grant) => {
                self.state = AuthState {
                    is_signed_in: true,
                    access_token: Some(grant.access_token),
                };
                self.status = AuthStatus::SignedIn;
                self.persist();
                info!(expires_in = ?grant.expires_in, "Signed in");
                Ok(())
            }
            Err(e) => {
                self.state = AuthState::default();
                self.status = AuthStatus::SignedOut;
                self.persist();
                Err(e)
            }
        }
    }

    pub async fn sign_out(&mut self) {
        if let Some(token) = self.state.access_token.take() {
            // The local state is cleared even if the provider refuses the revoke
            if let Err(e) = self.provider.revoke(&token).await {
                warn!(error = %e, "Failed to revoke access token");
            }
        }

        self.state = AuthState::default();
        self.status = AuthStatus::SignedOut;
        self.persist();
        info!("Signed out");
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.state)
            .map_err(AppError::from)
            .and_then(|contents| self.store.save(&contents));

        if let Err(e) = result {
            warn!(error = %e, "Failed to save auth state");
        }
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub(crate) struct MockProvider {
        pub grant: Option<String>,
        pub never_answers: bool,
        pub revoked: Arc<Mutex<Vec<String>>>,
    }

    impl MockProvider {
        pub(crate) fn granting(token: &str) -> Self {
            Self {
                grant: Some(token.to_string()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for MockProvider {
        async fn request_access_token(&self) -> Result<TokenGrant> {
            if self.never_answers {
                std::future::pending::<()>().await;
            }
            match &self.grant {
                Some(token) => Ok(TokenGrant {
                    access_token: token.clone(),
                    expires_in: Some(3599),
                }),
                None => Err(AppError::Auth("access_denied".to_string())),
            }
        }

        async fn revoke(&self, access_token: &str) -> Result<()> {
            self.revoked.lock().unwrap().push(access_token.to_string());
            Ok(())
        }
    }
}
