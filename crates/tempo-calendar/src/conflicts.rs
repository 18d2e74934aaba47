//! Conflict detection over a buffered window.
//!
//! Advisory only: the report never blocks event creation; acting on it is
//! the calling policy layer's decision.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::instrument;

use crate::client::CalendarClient;
use crate::error::CalendarError;
use crate::time::expand_window;

/// An existing event overlapping the searched window.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConflictingEvent {
    pub summary: String,
    pub start: String,
    pub end: String,
}

/// Result of a conflict search. Zero conflicts is a success, not an error.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConflictReport {
    pub conflict_count: usize,
    pub conflicts: Vec<ConflictingEvent>,
}

impl CalendarClient {
    /// Find events overlapping `[start, end)` expanded by `buffer` on both
    /// sides.
    #[instrument(skip(self), level = "info")]
    pub async fn find_conflicts(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        buffer: Duration,
    ) -> Result<ConflictReport, CalendarError> {
        let (window_start, window_end) = expand_window(start, end, buffer);
        let events = self.list_from_to(window_start, window_end).await?;

        let conflicts: Vec<ConflictingEvent> = events
            .into_iter()
            .map(|event| ConflictingEvent {
                summary: event.summary,
                start: event.start.to_rfc3339(),
                end: event.end.to_rfc3339(),
            })
            .collect();

        Ok(ConflictReport {
            conflict_count: conflicts.len(),
            conflicts,
        })
    }
}
