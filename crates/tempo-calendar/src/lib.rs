//! Calendar service client.
//!
//! Wraps the remote calendar API behind typed operations with a bounded
//! retry policy, timezone-aware window math, and conflict detection.

pub mod client;
pub mod conflicts;
pub mod error;
pub mod retry;
pub mod time;
pub mod types;

pub use client::CalendarClient;
pub use conflicts::{ConflictReport, ConflictingEvent};
pub use error::CalendarError;
pub use retry::RetryConfig;
pub use time::{day_bounds, ensure_timezone, expand_window, TimeError};
pub use types::Event;
