//! Event deletion.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use tempo_calendar::CalendarClient;

use crate::response::ToolResponse;
use crate::tool::Tool;

/// Delete a calendar event by its id.
///
/// The event is fetched first so the response can carry its summary; an
/// unresolvable id fails the whole operation before anything is deleted.
pub struct DeleteEventTool {
    client: Arc<CalendarClient>,
}

#[derive(Debug, Deserialize)]
struct DeleteEventArgs {
    event_id: String,
}

impl DeleteEventTool {
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for DeleteEventTool {
    fn name(&self) -> &str {
        "delete_event"
    }

    fn description(&self) -> &str {
        "Delete a calendar event when the user explicitly asks to cancel or \
         remove it. Requires a concrete event id; identify it with a listing \
         tool first if the user only gave a title or a time."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "event_id": {
                    "type": "string",
                    "description": "The unique calendar event id to delete"
                }
            },
            "required": ["event_id"]
        })
    }

    async fn invoke(&self, args: Value) -> ToolResponse {
        let args: DeleteEventArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(err) => return ToolResponse::validation(format!("invalid arguments: {err}")),
        };

        if args.event_id.trim().is_empty() {
            return ToolResponse::validation("event_id must not be empty");
        }

        let event = match self.client.get_event(&args.event_id).await {
            Ok(event) => event,
            Err(err) => return ToolResponse::from_calendar_error("delete_event", &err),
        };

        match self.client.delete_event(&args.event_id).await {
            Ok(()) => ToolResponse::ok(serde_json::json!({
                "summary": event.summary,
                "eventId": args.event_id,
            })),
            Err(err) => ToolResponse::from_calendar_error("delete_event", &err),
        }
    }
}
