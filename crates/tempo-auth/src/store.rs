//! Persisted token state and the credential store.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::error::AuthError;
use crate::oauth::{GoogleOAuth, TokenResponse};
use crate::secrets::ClientSecrets;

/// Token set for OAuth2 authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API requests
    pub access_token: String,

    /// Optional refresh token for token renewal
    pub refresh_token: Option<String>,

    /// Token expiration timestamp (Unix timestamp)
    pub expires_at: i64,

    /// Scopes granted to this token
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Build a token set from a token endpoint response.
    ///
    /// Refresh responses omit the refresh token; the previous one is kept.
    /// A response without an explicit scope list is assumed to grant what
    /// was requested.
    pub fn from_response(
        response: TokenResponse,
        previous_refresh: Option<String>,
        requested_scopes: &[String],
    ) -> Self {
        let expires_in = response.expires_in.unwrap_or(3600);
        let scopes = response
            .scope
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| requested_scopes.to_vec());

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: chrono::Utc::now().timestamp() + expires_in,
            scopes,
        }
    }

    /// Check if the token needs refresh (within 5 minutes of expiry)
    pub fn needs_refresh(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - 300
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at
    }

    /// Check if the token carries every required scope
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }
}

/// Credential store for a single user.
///
/// Owns the token file and produces a usable access token on demand:
/// a persisted valid token is used as-is, an expired one is refreshed and
/// re-persisted, and only when neither works does the interactive browser
/// flow run. The last good token is cached in memory so repeated calls do
/// not touch the filesystem.
pub struct CredentialStore {
    credentials_file: PathBuf,
    token_file: PathBuf,
    scopes: Vec<String>,
    token_url: Option<String>,
    cached: RwLock<Option<TokenSet>>,
}

impl CredentialStore {
    pub fn new(credentials_file: PathBuf, token_file: PathBuf, scopes: Vec<String>) -> Self {
        Self {
            credentials_file,
            token_file,
            scopes,
            token_url: None,
            cached: RwLock::new(None),
        }
    }

    /// Point refresh and code exchanges at a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = Some(token_url.into());
        self
    }

    /// Produce a currently valid access token.
    ///
    /// Authorization failures are terminal for the call; retrying is the
    /// caller's decision.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.needs_refresh() && token.has_scopes(&self.scopes) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let token = self.obtain().await?;
        let access = token.access_token.clone();
        *self.cached.write().await = Some(token);
        Ok(access)
    }

    /// Drop the in-memory token so the next call re-runs the load algorithm.
    ///
    /// Used when the service rejects a token mid-call: the persisted state
    /// is re-examined and refreshed on the next attempt.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
        tracing::debug!("cached credential invalidated");
    }

    async fn obtain(&self) -> Result<TokenSet, AuthError> {
        let persisted = self.read_persisted();

        if let Some(token) = &persisted {
            if !token.needs_refresh() && token.has_scopes(&self.scopes) {
                tracing::debug!("using persisted token from {:?}", self.token_file);
                return Ok(token.clone());
            }
        }

        if let Some(token) = &persisted {
            if let Some(refresh_token) = token.refresh_token.clone() {
                match self.oauth()?.refresh(&refresh_token).await {
                    Ok(response) => {
                        let renewed = TokenSet::from_response(
                            response,
                            Some(refresh_token),
                            &self.scopes,
                        );
                        self.persist(&renewed)?;
                        tracing::info!("refreshed calendar credential");
                        return Ok(renewed);
                    }
                    Err(err) => {
                        tracing::warn!(
                            "token refresh failed, falling back to interactive authorization: {err}"
                        );
                    }
                }
            }
        }

        let response = self.oauth()?.authenticate(&self.scopes).await?;
        let token = TokenSet::from_response(response, None, &self.scopes);
        self.persist(&token)?;
        tracing::info!("completed interactive calendar authorization");
        Ok(token)
    }

    fn oauth(&self) -> Result<GoogleOAuth, AuthError> {
        let secrets = ClientSecrets::load(&self.credentials_file)?;
        let mut oauth = GoogleOAuth::new(&secrets);
        if let Some(url) = &self.token_url {
            oauth = oauth.with_token_url(url.clone());
        }
        Ok(oauth)
    }

    /// Read the persisted token, treating a missing or malformed file as
    /// "no token".
    fn read_persisted(&self) -> Option<TokenSet> {
        if !self.token_file.exists() {
            return None;
        }

        let contents = match fs::read_to_string(&self.token_file) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!("failed to read token file {:?}: {err}", self.token_file);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(token) => Some(token),
            Err(err) => {
                tracing::warn!("ignoring malformed token file {:?}: {err}", self.token_file);
                None
            }
        }
    }

    fn persist(&self, token: &TokenSet) -> Result<(), AuthError> {
        if let Some(parent) = self.token_file.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::Storage(format!(
                    "failed to create token directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(token)
            .map_err(|e| AuthError::Storage(format!("failed to serialize token: {e}")))?;

        fs::write(&self.token_file, json).map_err(|e| {
            AuthError::Storage(format!(
                "failed to write token file {}: {e}",
                self.token_file.display()
            ))
        })?;

        tracing::info!("stored token at {:?}", self.token_file);
        Ok(())
    }
}
