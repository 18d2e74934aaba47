//! Client-secrets file parsing.
//!
//! Google distributes desktop-app OAuth credentials as a JSON file with the
//! client under an `installed` key (or `web` for web applications).

use serde::Deserialize;
use std::path::Path;

use crate::error::AuthError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth client identity loaded from a credentials file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,

    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URL.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Load client secrets from a Google-format credentials file.
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        if !path.exists() {
            return Err(AuthError::MissingClientSecrets(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| AuthError::Storage(format!("failed to read {}: {e}", path.display())))?;

        let file: SecretsFile = serde_json::from_str(&contents)
            .map_err(|e| AuthError::InvalidClientSecrets(e.to_string()))?;

        file.installed.or(file.web).ok_or_else(|| {
            AuthError::InvalidClientSecrets(
                "expected an `installed` or `web` client entry".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_load_installed_client() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            r#"{"installed": {"client_id": "abc.apps.googleusercontent.com", "client_secret": "shh"}}"#,
        )
        .unwrap();

        let secrets = ClientSecrets::load(&path).unwrap();
        assert_eq!(secrets.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(secrets.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn test_missing_file_is_a_typed_error() {
        let result = ClientSecrets::load(Path::new("/nonexistent/credentials.json"));
        assert!(matches!(result, Err(AuthError::MissingClientSecrets(_))));
    }

    #[test]
    fn test_file_without_client_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"something_else": {}}"#).unwrap();

        let result = ClientSecrets::load(&path);
        assert!(matches!(result, Err(AuthError::InvalidClientSecrets(_))));
    }
}
