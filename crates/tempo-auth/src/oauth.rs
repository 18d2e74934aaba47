//! Google OAuth2 exchanges and the interactive authorization flow.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::oneshot;
use warp::Filter;

use crate::error::AuthError;
use crate::secrets::ClientSecrets;

/// Port the local callback server binds to during the interactive flow.
const CALLBACK_PORT: u16 = 8080;

/// Token endpoint response for both the code exchange and the refresh
/// exchange. Google omits `refresh_token` on refresh responses.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub expires_in: Option<i64>,

    #[serde(default)]
    pub scope: Option<String>,
}

/// OAuth2 client for the Google token endpoints.
pub struct GoogleOAuth {
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
}

impl GoogleOAuth {
    pub fn new(secrets: &ClientSecrets) -> Self {
        Self {
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            auth_url: secrets.auth_uri.clone(),
            token_url: secrets.token_uri.clone(),
        }
    }

    /// Point the exchanges at a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Generate the authorization URL for the browser flow.
    ///
    /// Returns (url, state) where state must be verified on callback.
    pub fn authorization_url(&self, port: u16, scopes: &[String]) -> (String, String) {
        let state = uuid::Uuid::new_v4().to_string();
        let redirect_uri = format!("http://localhost:{port}/callback");
        let scope = scopes.join(" ");

        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=offline&prompt=consent",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&state),
        );

        (url, state)
    }

    /// Exchange an authorization code for tokens.
    #[tracing::instrument(skip(self, code), level = "info")]
    pub async fn exchange_code(&self, code: &str, port: u16) -> Result<TokenResponse, AuthError> {
        let redirect_uri = format!("http://localhost:{port}/callback");
        let client = reqwest::Client::new();

        let response = client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", &redirect_uri),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::FlowFailed(format!(
                "token exchange failed: {error_text}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))
    }

    /// Refresh an expired access token.
    #[tracing::instrument(skip(self, refresh_token), level = "info")]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let client = reqwest::Client::new();

        let response = client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshRejected(error_text));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))
    }

    /// Perform the full interactive flow with browser and local callback.
    pub async fn authenticate(&self, scopes: &[String]) -> Result<TokenResponse, AuthError> {
        let (auth_url, csrf_state) = self.authorization_url(CALLBACK_PORT, scopes);

        tracing::info!("Opening browser for calendar authorization...");
        tracing::info!("Auth URL: {}", auth_url);

        // Local callback server hands the code back over a oneshot channel.
        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(tokio::sync::Mutex::new(Some(tx)));

        let routes = warp::get()
            .and(warp::path("callback"))
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::any().map(move || tx.clone()))
            .and_then(
                |params: HashMap<String, String>,
                 tx: Arc<tokio::sync::Mutex<Option<oneshot::Sender<(String, String)>>>>| async move {
                    let code = params.get("code").cloned().unwrap_or_default();
                    let state = params.get("state").cloned().unwrap_or_default();

                    if let Some(sender) = tx.lock().await.take() {
                        let _ = sender.send((code, state));
                    }

                    Ok::<_, warp::Rejection>(warp::reply::html(
                        "<html><body><h1>Authorization complete</h1>\
                         <p>You can close this window and return to Tempo.</p></body></html>",
                    ))
                },
            );

        let server = warp::serve(routes).bind(([127, 0, 0, 1], CALLBACK_PORT));
        tokio::spawn(server);

        webbrowser::open(&auth_url)
            .map_err(|e| AuthError::FlowFailed(format!("failed to open browser: {e}")))?;

        let (code, state) = rx
            .await
            .map_err(|_| AuthError::FlowFailed("callback channel closed".to_string()))?;

        if code.is_empty() {
            return Err(AuthError::FlowFailed(
                "callback did not carry an authorization code".to_string(),
            ));
        }

        if state != csrf_state {
            return Err(AuthError::StateMismatch);
        }

        self.exchange_code(&code, CALLBACK_PORT).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn test_secrets() -> ClientSecrets {
        serde_json::from_str(
            r#"{"client_id": "test_client_id", "client_secret": "test_client_secret"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_authorization_url_carries_scope_and_offline_access() {
        let oauth = GoogleOAuth::new(&test_secrets());
        let scopes = vec![crate::CALENDAR_SCOPE.to_string()];
        let (url, _state) = oauth.authorization_url(8080, &scopes);

        assert!(url.contains("scope="));
        assert!(url.contains("calendar"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state="));
    }

    #[test]
    fn test_state_is_unique_per_url() {
        let oauth = GoogleOAuth::new(&test_secrets());
        let scopes = vec![crate::CALENDAR_SCOPE.to_string()];
        let (_, state1) = oauth.authorization_url(8080, &scopes);
        let (_, state2) = oauth.authorization_url(8080, &scopes);
        assert_ne!(state1, state2);
    }

    #[tokio::test]
    async fn test_refresh_rejection_is_typed() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let oauth = GoogleOAuth::new(&test_secrets()).with_token_url(server.uri());
        let result = oauth.refresh("stale-refresh-token").await;

        match result {
            Err(AuthError::RefreshRejected(body)) => assert!(body.contains("invalid_grant")),
            other => panic!("expected RefreshRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_parses_token_response() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh-token",
                "expires_in": 3599,
                "scope": "https://www.googleapis.com/auth/calendar",
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let oauth = GoogleOAuth::new(&test_secrets()).with_token_url(server.uri());
        let response = oauth.refresh("refresh-token").await.unwrap();

        assert_eq!(response.access_token, "fresh-token");
        assert_eq!(response.expires_in, Some(3599));
        assert!(response.refresh_token.is_none());
    }
}
