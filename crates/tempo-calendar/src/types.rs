//! Calendar API types and data structures.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// Placeholder summary for events the service returns without one.
pub const DEFAULT_SUMMARY: &str = "Untitled event";

/// A calendar event, typed at the service-client boundary.
///
/// Start and end always carry their explicit offset as received from the
/// service; all-day events are pinned to midnight UTC with `all_day` set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub calendar_id: String,
    pub summary: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub all_day: bool,
}

// API response types

/// Event as returned by the calendar API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
}

/// Event time: a timezone-qualified datetime, or a bare date for all-day
/// events.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

/// API response for an event list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

impl Event {
    /// Convert an API response event into the owned type.
    ///
    /// Fails with `InvalidResponse` when a time is missing or unparseable
    /// rather than guessing; nothing untyped crosses this boundary.
    pub fn from_api(api: ApiEvent, calendar_id: &str) -> Result<Self, CalendarError> {
        let (start, all_day) = parse_event_time(api.start.as_ref(), &api.id, "start")?;
        let (end, _) = parse_event_time(api.end.as_ref(), &api.id, "end")?;

        Ok(Self {
            id: api.id,
            calendar_id: calendar_id.to_string(),
            summary: api
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
            start,
            end,
            all_day,
        })
    }
}

fn parse_event_time(
    time: Option<&ApiEventTime>,
    event_id: &str,
    field: &str,
) -> Result<(DateTime<FixedOffset>, bool), CalendarError> {
    let Some(time) = time else {
        return Err(CalendarError::InvalidResponse(format!(
            "event {event_id} is missing its {field} time"
        )));
    };

    if let Some(date_time) = &time.date_time {
        let parsed = DateTime::parse_from_rfc3339(date_time).map_err(|e| {
            CalendarError::InvalidResponse(format!(
                "event {event_id} has an unparseable {field} dateTime {date_time:?}: {e}"
            ))
        })?;
        return Ok((parsed, false));
    }

    if let Some(date) = &time.date {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
            CalendarError::InvalidResponse(format!(
                "event {event_id} has an unparseable {field} date {date:?}: {e}"
            ))
        })?;
        let midnight = parsed.and_hms_opt(0, 0, 0).ok_or_else(|| {
            CalendarError::InvalidResponse(format!("event {event_id} has an invalid {field} date"))
        })?;
        return Ok((midnight.and_utc().fixed_offset(), true));
    }

    Err(CalendarError::InvalidResponse(format!(
        "event {event_id} carries neither a {field} dateTime nor a date"
    )))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_event_from_api() {
        let json = r#"{
            "id": "event123",
            "summary": "Team Meeting",
            "start": {"dateTime": "2026-01-30T10:00:00+02:00"},
            "end": {"dateTime": "2026-01-30T11:00:00+02:00"}
        }"#;

        let api_event: ApiEvent = serde_json::from_str(json).unwrap();
        let event = Event::from_api(api_event, "primary").unwrap();

        assert_eq!(event.id, "event123");
        assert_eq!(event.calendar_id, "primary");
        assert_eq!(event.summary, "Team Meeting");
        assert_eq!(event.start.to_rfc3339(), "2026-01-30T10:00:00+02:00");
        assert!(!event.all_day);
    }

    #[test]
    fn test_missing_summary_gets_the_placeholder() {
        let json = r#"{
            "id": "event456",
            "start": {"dateTime": "2026-01-30T10:00:00Z"},
            "end": {"dateTime": "2026-01-30T11:00:00Z"}
        }"#;

        let api_event: ApiEvent = serde_json::from_str(json).unwrap();
        let event = Event::from_api(api_event, "primary").unwrap();
        assert_eq!(event.summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn test_all_day_event() {
        let json = r#"{
            "id": "event789",
            "summary": "Holiday",
            "start": {"date": "2026-02-01"},
            "end": {"date": "2026-02-02"}
        }"#;

        let api_event: ApiEvent = serde_json::from_str(json).unwrap();
        let event = Event::from_api(api_event, "primary").unwrap();

        assert!(event.all_day);
        assert_eq!(event.start.to_rfc3339(), "2026-02-01T00:00:00+00:00");
    }

    #[test]
    fn test_event_without_times_is_rejected() {
        let json = r#"{"id": "bare", "summary": "No times"}"#;

        let api_event: ApiEvent = serde_json::from_str(json).unwrap();
        let result = Event::from_api(api_event, "primary");
        assert!(matches!(result, Err(CalendarError::InvalidResponse(_))));
    }

    #[test]
    fn test_unparseable_datetime_is_rejected() {
        let json = r#"{
            "id": "bad",
            "start": {"dateTime": "tomorrow-ish"},
            "end": {"dateTime": "2026-01-30T11:00:00Z"}
        }"#;

        let api_event: ApiEvent = serde_json::from_str(json).unwrap();
        let result = Event::from_api(api_event, "primary");
        assert!(matches!(result, Err(CalendarError::InvalidResponse(_))));
    }

    #[test]
    fn test_list_response_defaults_to_empty_items() {
        let list: EventListResponse = serde_json::from_str("{}").unwrap();
        assert!(list.items.is_empty());
        assert!(list.next_page_token.is_none());
    }
}
