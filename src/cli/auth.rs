use super::ClientContext;
use crate::client::AuthStatus;
use crate::error::Result;
use clap::Subcommand;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Sign in through the Google consent screen
    Login,
    /// Revoke the access token and forget it
    Logout,
    /// Show whether a token is stored
    Status,
}

impl AuthAction {
    pub(crate) async fn execute(&self, ctx: &mut ClientContext) -> Result<()> {
        match self {
            AuthAction::Login => ctx.session.sign_in().await,
            AuthAction::Logout => {
                ctx.sign_out().await;
                Ok(())
            }
            AuthAction::Status => {
                status(ctx);
                Ok(())
            }
        }
    }
}

pub(super) fn status(ctx: &ClientContext) {
    match ctx.session.status() {
        AuthStatus::SignedIn => info!("Signed in"),
        AuthStatus::Loading => info!("Sign-in in progress"),
        AuthStatus::SignedOut => info!("Signed out"),
    }
}
