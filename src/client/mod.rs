mod api;
mod auth;
mod cache;
mod identity;
mod store;

pub use api::HttpFacade;
pub use auth::{AuthSession, AuthStatus};
pub use cache::{SpreadsheetService, SystemClock};
pub use identity::GoogleIdentity;
pub use store::FileAuthStore;
