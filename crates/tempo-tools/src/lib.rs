//! Tool-level calendar operations.
//!
//! Each tool is a plain struct implementing the [`Tool`] capability trait
//! and returning the uniform [`ToolResponse`] envelope: every internal
//! error is converted at this boundary, nothing is raised across it.

pub mod create_event;
pub mod delete_event;
pub mod list_events;
pub mod response;
pub mod tool;

pub use create_event::{CheckConflictsTool, CreateEventTool};
pub use delete_event::DeleteEventTool;
pub use list_events::{ListNextEventsTool, ListTodayTool};
pub use response::{ToolError, ToolResponse};
pub use tool::{Tool, ToolRegistry};
