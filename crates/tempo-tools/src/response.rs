//! The uniform operation-result envelope.
//!
//! Every tool-level call returns a value, never an error: internal error
//! types are converted here, at the single boundary the embedding agent
//! sees.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tempo_calendar::CalendarError;

/// Machine code for failures originating at the calendar service.
pub const CODE_CALENDAR_SERVICE: &str = "calendar_service_error";

/// Machine code for failures producing a usable credential.
pub const CODE_AUTH: &str = "auth_error";

/// Machine code for argument errors caught before any remote call.
pub const CODE_VALIDATION: &str = "validation_error";

/// Failure half of the envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolError {
    pub message: String,
    pub status: Option<u16>,
    pub reason: Option<String>,
    pub code: Option<String>,
}

/// Uniform success/error wrapper for every tool-level operation.
///
/// Exactly one of `data`/`error` is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResponse {
    pub ok: bool,
    pub data: Option<Value>,
    pub error: Option<ToolError>,
}

impl ToolResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(
        message: impl Into<String>,
        status: Option<u16>,
        reason: Option<String>,
        code: &str,
    ) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(ToolError {
                message: message.into(),
                status,
                reason,
                code: Some(code.to_string()),
            }),
        }
    }

    /// A precondition failure caught before any remote call.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::err(message, None, None, CODE_VALIDATION)
    }

    /// Convert a client error into the envelope.
    pub fn from_calendar_error(operation: &str, err: &CalendarError) -> Self {
        match err {
            CalendarError::Auth(auth) => Self::err(
                format!("Authorization failed during {operation}."),
                None,
                Some(auth.to_string()),
                CODE_AUTH,
            ),
            other => Self::err(
                format!("Calendar service error during {operation}."),
                other.status(),
                other.reason(),
                CODE_CALENDAR_SERVICE,
            ),
        }
    }
}
