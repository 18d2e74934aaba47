//! Event creation and conflict checking.

use async_trait::async_trait;
use chrono::Duration;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use tempo_calendar::{ensure_timezone, CalendarClient};

use crate::response::ToolResponse;
use crate::tool::Tool;

/// Create a calendar event from a title and a start/end pair.
pub struct CreateEventTool {
    client: Arc<CalendarClient>,
}

#[derive(Debug, Deserialize)]
struct CreateEventArgs {
    title: String,
    start: String,
    end: String,
}

impl CreateEventTool {
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CreateEventTool {
    fn name(&self) -> &str {
        "create_event"
    }

    fn description(&self) -> &str {
        "Create a calendar event. Use when the user asks to book, schedule, \
         or add something to their calendar. Requires a title and explicit \
         start and end times."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Event title"
                },
                "start": {
                    "type": "string",
                    "description": "Start time, ISO 8601; the configured timezone is assumed when no offset is given"
                },
                "end": {
                    "type": "string",
                    "description": "End time, ISO 8601"
                }
            },
            "required": ["title", "start", "end"]
        })
    }

    async fn invoke(&self, args: Value) -> ToolResponse {
        let args: CreateEventArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(err) => return ToolResponse::validation(format!("invalid arguments: {err}")),
        };

        let zone = self.client.zone();
        let start = match ensure_timezone(&args.start, zone) {
            Ok(start) => start,
            Err(err) => return ToolResponse::validation(err.to_string()),
        };
        let end = match ensure_timezone(&args.end, zone) {
            Ok(end) => end,
            Err(err) => return ToolResponse::validation(err.to_string()),
        };

        match self.client.create_event(&args.title, start, end).await {
            Ok(event) => ToolResponse::ok(serde_json::json!({
                "summary": event.summary,
                "start": start.to_rfc3339(),
                "end": end.to_rfc3339(),
            })),
            Err(err) => ToolResponse::from_calendar_error("create_event", &err),
        }
    }
}

/// Advisory overlap check for a proposed booking window.
pub struct CheckConflictsTool {
    client: Arc<CalendarClient>,
}

#[derive(Debug, Deserialize)]
struct CheckConflictsArgs {
    start: String,
    end: String,
    #[serde(default)]
    buffer_minutes: i64,
}

impl CheckConflictsTool {
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CheckConflictsTool {
    fn name(&self) -> &str {
        "check_conflicts"
    }

    fn description(&self) -> &str {
        "List existing events overlapping a proposed time window, optionally \
         padded by a buffer on both sides. Advisory: it does not block \
         creating the event."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "start": {
                    "type": "string",
                    "description": "Window start, ISO 8601"
                },
                "end": {
                    "type": "string",
                    "description": "Window end, ISO 8601"
                },
                "buffer_minutes": {
                    "type": "integer",
                    "description": "Minutes of padding applied to both sides",
                    "default": 0
                }
            },
            "required": ["start", "end"]
        })
    }

    async fn invoke(&self, args: Value) -> ToolResponse {
        let args: CheckConflictsArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(err) => return ToolResponse::validation(format!("invalid arguments: {err}")),
        };

        if args.buffer_minutes < 0 {
            return ToolResponse::validation("buffer_minutes must not be negative");
        }

        let zone = self.client.zone();
        let start = match ensure_timezone(&args.start, zone) {
            Ok(start) => start,
            Err(err) => return ToolResponse::validation(err.to_string()),
        };
        let end = match ensure_timezone(&args.end, zone) {
            Ok(end) => end,
            Err(err) => return ToolResponse::validation(err.to_string()),
        };

        let buffer = Duration::minutes(args.buffer_minutes);
        match self.client.find_conflicts(start, end, buffer).await {
            Ok(report) => match serde_json::to_value(&report) {
                Ok(data) => ToolResponse::ok(data),
                Err(err) => ToolResponse::err(
                    "Failed to encode conflict report.",
                    None,
                    Some(err.to_string()),
                    crate::response::CODE_CALENDAR_SERVICE,
                ),
            },
            Err(err) => ToolResponse::from_calendar_error("check_conflicts", &err),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::response::{CODE_CALENDAR_SERVICE, CODE_VALIDATION};
    use crate::test_support::seeded_client;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_round_trips_normalized_times() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(body_partial_json(serde_json::json!({
                "start": {"dateTime": "2026-01-30T10:00:00+00:00"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "new1",
                "summary": "Test",
                "start": {"dateTime": "2026-01-30T10:00:00+00:00"},
                "end": {"dateTime": "2026-01-30T11:00:00+00:00"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = CreateEventTool::new(seeded_client(&dir, &server));
        let response = tool
            .invoke(serde_json::json!({
                "title": "Test",
                "start": "2026-01-30T10:00:00",
                "end": "2026-01-30T11:00:00"
            }))
            .await;

        assert!(response.ok, "unexpected failure: {:?}", response.error);
        assert_eq!(
            response.data,
            Some(serde_json::json!({
                "summary": "Test",
                "start": "2026-01-30T10:00:00+00:00",
                "end": "2026-01-30T11:00:00+00:00"
            }))
        );
    }

    #[tokio::test]
    async fn test_create_converts_service_failure_into_the_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(403).set_body_string("insufficient permissions"))
            .expect(1)
            .mount(&server)
            .await;

        let tool = CreateEventTool::new(seeded_client(&dir, &server));
        let response = tool
            .invoke(serde_json::json!({
                "title": "Test",
                "start": "2026-01-30T10:00:00",
                "end": "2026-01-30T11:00:00"
            }))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.status, Some(403));
        assert_eq!(error.code.as_deref(), Some(CODE_CALENDAR_SERVICE));
        assert!(error.message.contains("create_event"));
    }

    #[tokio::test]
    async fn test_create_rejects_unparseable_times_locally() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;

        let tool = CreateEventTool::new(seeded_client(&dir, &server));
        let response = tool
            .invoke(serde_json::json!({
                "title": "Test",
                "start": "sometime tomorrow",
                "end": "2026-01-30T11:00:00"
            }))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code.as_deref(), Some(CODE_VALIDATION));
        assert_eq!(server.received_requests().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_conflict_check_expands_window_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("timeMin", "2026-01-30T09:45:00+00:00"))
            .and(query_param("timeMax", "2026-01-30T11:15:00+00:00"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{
                    "id": "busy1",
                    "summary": "Existing Meeting",
                    "start": {"dateTime": "2026-01-30T10:15:00+00:00"},
                    "end": {"dateTime": "2026-01-30T10:45:00+00:00"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = CheckConflictsTool::new(seeded_client(&dir, &server));
        let response = tool
            .invoke(serde_json::json!({
                "start": "2026-01-30T10:00:00",
                "end": "2026-01-30T11:00:00",
                "buffer_minutes": 15
            }))
            .await;

        assert!(response.ok, "unexpected failure: {:?}", response.error);
        assert_eq!(
            response.data,
            Some(serde_json::json!({
                "conflict_count": 1,
                "conflicts": [{
                    "summary": "Existing Meeting",
                    "start": "2026-01-30T10:15:00+00:00",
                    "end": "2026-01-30T10:45:00+00:00"
                }]
            }))
        );
    }

    #[tokio::test]
    async fn test_conflict_check_with_free_window_is_a_success() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
            )
            .mount(&server)
            .await;

        let tool = CheckConflictsTool::new(seeded_client(&dir, &server));
        let response = tool
            .invoke(serde_json::json!({
                "start": "2026-01-30T10:00:00",
                "end": "2026-01-30T11:00:00"
            }))
            .await;

        assert!(response.ok);
        assert_eq!(response.data.unwrap()["conflict_count"], 0);
    }

    #[tokio::test]
    async fn test_negative_buffer_is_rejected_locally() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;

        let tool = CheckConflictsTool::new(seeded_client(&dir, &server));
        let response = tool
            .invoke(serde_json::json!({
                "start": "2026-01-30T10:00:00",
                "end": "2026-01-30T11:00:00",
                "buffer_minutes": -5
            }))
            .await;

        assert_eq!(
            response.error.unwrap().code.as_deref(),
            Some(CODE_VALIDATION)
        );
        assert_eq!(server.received_requests().await.unwrap().len(), 0);
    }
}
