//! OAuth2 credential handling for the calendar service.
//!
//! Loads a persisted token, refreshes it when expired, and falls back to the
//! interactive browser flow when no usable token exists. Single user.

pub mod error;
pub mod oauth;
pub mod secrets;
pub mod store;

pub use error::AuthError;
pub use oauth::GoogleOAuth;
pub use secrets::ClientSecrets;
pub use store::{CredentialStore, TokenSet};

/// Scope required for full calendar access.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Default scopes requested during authorization.
pub fn default_scopes() -> Vec<String> {
    vec![CALENDAR_SCOPE.to_string()]
}
