//! Upcoming-events and today listings.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use tempo_calendar::{day_bounds, CalendarClient, Event};

use crate::response::ToolResponse;
use crate::tool::Tool;

const DEFAULT_COUNT: i64 = 5;

fn project_events(events: Vec<Event>) -> Value {
    let projected: Vec<Value> = events
        .into_iter()
        .map(|event| {
            serde_json::json!({
                "summary": event.summary,
                "start": event.start.to_rfc3339(),
                "end": event.end.to_rfc3339(),
                "eventId": event.id,
            })
        })
        .collect();

    serde_json::json!({
        "count": projected.len(),
        "events": projected,
    })
}

/// List the next N upcoming events starting from now.
pub struct ListNextEventsTool {
    client: Arc<CalendarClient>,
}

#[derive(Debug, Deserialize)]
struct ListNextEventsArgs {
    #[serde(default = "default_count")]
    n: i64,
}

fn default_count() -> i64 {
    DEFAULT_COUNT
}

impl ListNextEventsTool {
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListNextEventsTool {
    fn name(&self) -> &str {
        "list_next_events"
    }

    fn description(&self) -> &str {
        "List the next N upcoming calendar events starting from now, ordered \
         by start time. Use when the user asks to see their schedule or the \
         next few events. Defaults to 5 when N is not given."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "n": {
                    "type": "integer",
                    "description": "Number of upcoming events to list",
                    "default": DEFAULT_COUNT
                }
            },
            "required": []
        })
    }

    async fn invoke(&self, args: Value) -> ToolResponse {
        let args: ListNextEventsArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(err) => return ToolResponse::validation(format!("invalid arguments: {err}")),
        };

        // Checked before any remote call.
        if args.n <= 0 {
            return ToolResponse::validation("a positive number of events is required");
        }

        let now = chrono::Utc::now().with_timezone(&self.client.zone());
        match self.client.list_events(now, args.n as usize).await {
            Ok(events) => ToolResponse::ok(project_events(events)),
            Err(err) => ToolResponse::from_calendar_error("list_next_events", &err),
        }
    }
}

/// List everything on today's calendar in the configured zone.
pub struct ListTodayTool {
    client: Arc<CalendarClient>,
}

impl ListTodayTool {
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListTodayTool {
    fn name(&self) -> &str {
        "list_today_events"
    }

    fn description(&self) -> &str {
        "List every event between midnight and midnight of the current day \
         in the configured timezone. Use when the user asks what is on \
         today."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn invoke(&self, _args: Value) -> ToolResponse {
        let now = chrono::Utc::now().with_timezone(&self.client.zone());
        let (start_of_day, start_of_next_day) = match day_bounds(now) {
            Ok(bounds) => bounds,
            Err(err) => {
                return ToolResponse::validation(format!("could not compute day bounds: {err}"))
            }
        };

        match self.client.list_from_to(start_of_day, start_of_next_day).await {
            Ok(events) => ToolResponse::ok(project_events(events)),
            Err(err) => ToolResponse::from_calendar_error("list_today_events", &err),
        }
    }
}
