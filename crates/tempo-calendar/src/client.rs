//! Calendar API client.
//!
//! Every operation funnels through `execute`, which owns credential
//! loading, the transient/fatal classification, and the retry schedule.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use tracing::instrument;

use tempo_auth::CredentialStore;

use crate::error::CalendarError;
use crate::retry::RetryConfig;
use crate::types::{ApiEvent, Event, EventListResponse};

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
    calendar_id: String,
    zone: Tz,
    store: CredentialStore,
    retry: RetryConfig,
}

impl CalendarClient {
    pub fn new(calendar_id: impl Into<String>, zone: Tz, store: CredentialStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: CALENDAR_API_BASE.to_string(),
            calendar_id: calendar_id.into(),
            zone,
            store,
            retry: RetryConfig::default(),
        }
    }

    /// Point the client at a different service endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the retry schedule for this instance.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Zone used to stamp outgoing timestamps.
    pub fn zone(&self) -> Tz {
        self.zone
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!(
            "{}/calendars/{}/events/{}",
            self.base_url,
            urlencoding::encode(&self.calendar_id),
            urlencoding::encode(event_id)
        )
    }

    /// Create a new event stamped with the configured zone.
    #[instrument(skip(self), level = "info")]
    pub async fn create_event(
        &self,
        summary: &str,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<Event, CalendarError> {
        let body = serde_json::json!({
            "summary": summary,
            "start": { "dateTime": start.to_rfc3339(), "timeZone": self.zone.name() },
            "end": { "dateTime": end.to_rfc3339(), "timeZone": self.zone.name() },
        });

        let response = self
            .execute("create_event", self.http.post(self.events_url()).json(&body))
            .await?;

        let api_event: ApiEvent = decode(response).await?;
        Event::from_api(api_event, &self.calendar_id)
    }

    /// List events starting at or after `time_min`, ordered by start time,
    /// recurring events expanded to single occurrences, capped at
    /// `max_results`.
    #[instrument(skip(self), level = "info")]
    pub async fn list_events(
        &self,
        time_min: DateTime<Tz>,
        max_results: usize,
    ) -> Result<Vec<Event>, CalendarError> {
        let request = self.http.get(self.events_url()).query(&[
            ("timeMin", time_min.to_rfc3339()),
            ("maxResults", max_results.to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ]);

        let response = self.execute("list_events", request).await?;
        let list: EventListResponse = decode(response).await?;
        list.items
            .into_iter()
            .map(|item| Event::from_api(item, &self.calendar_id))
            .collect()
    }

    /// List events overlapping `[time_min, time_max)`, same ordering.
    #[instrument(skip(self), level = "info")]
    pub async fn list_from_to(
        &self,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
    ) -> Result<Vec<Event>, CalendarError> {
        let request = self.http.get(self.events_url()).query(&[
            ("timeMin", time_min.to_rfc3339()),
            ("timeMax", time_max.to_rfc3339()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ]);

        let response = self.execute("list_from_to", request).await?;
        let list: EventListResponse = decode(response).await?;
        list.items
            .into_iter()
            .map(|item| Event::from_api(item, &self.calendar_id))
            .collect()
    }

    /// Fetch a single event by id.
    #[instrument(skip(self), level = "info")]
    pub async fn get_event(&self, event_id: &str) -> Result<Event, CalendarError> {
        let response = self
            .execute("get_event", self.http.get(self.event_url(event_id)))
            .await?;

        let api_event: ApiEvent = decode(response).await?;
        Event::from_api(api_event, &self.calendar_id)
    }

    /// Delete an event by id. Fails with `NotFound` if the id is already
    /// gone.
    #[instrument(skip(self), level = "info")]
    pub async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        self.execute("delete_event", self.http.delete(self.event_url(event_id)))
            .await?;
        Ok(())
    }

    /// Run one remote call under the retry policy.
    ///
    /// The request is re-cloned per attempt and carries a bearer token
    /// obtained from the credential store at that moment, so a token
    /// refreshed between attempts is picked up. Transient failures back
    /// off exponentially with jitter; a rejected credential additionally
    /// invalidates the cached token before the next attempt. Fatal
    /// failures and an exhausted budget return the last observed error.
    async fn execute(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CalendarError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let token = self.store.access_token().await?;
            let attempt_request = request
                .try_clone()
                .ok_or_else(|| {
                    CalendarError::Request("request body cannot be replayed".to_string())
                })?
                .bearer_auth(token);

            let outcome = match attempt_request.send().await {
                Ok(response) => classify(response).await,
                Err(err) => Err(CalendarError::Network(err)),
            };

            match outcome {
                Ok(response) => {
                    if attempt > 1 {
                        tracing::info!(operation, attempt, "calendar call succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    if matches!(err, CalendarError::TokenExpired) {
                        self.store.invalidate().await;
                    }

                    let delay = self.retry.jittered(self.retry.backoff(attempt));
                    tracing::warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient calendar failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::error!(operation, attempt, error = %err, "calendar call failed");
                    return Err(err);
                }
            }
        }
    }
}

/// Map a response status onto the error taxonomy.
async fn classify(response: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    Err(match status.as_u16() {
        401 => CalendarError::TokenExpired,
        403 => CalendarError::PermissionDenied(body_text(response).await),
        404 | 410 => CalendarError::NotFound(body_text(response).await),
        408 => CalendarError::RequestTimeout,
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            CalendarError::RateLimited { retry_after }
        }
        code if status.is_server_error() => CalendarError::ServerError {
            status: code,
            body: body_text(response).await,
        },
        code => CalendarError::Api {
            status: code,
            body: body_text(response).await,
        },
    })
}

async fn body_text(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CalendarError> {
    response
        .json()
        .await
        .map_err(|e| CalendarError::InvalidResponse(format!("JSON parse error: {e}")))
}
