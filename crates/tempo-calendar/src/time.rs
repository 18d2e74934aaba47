//! Timezone-aware window math.
//!
//! Every timestamp sent to the remote service must carry an explicit,
//! consistent offset; these helpers normalize caller input to the
//! configured zone and compute day-boundary and buffered windows.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeError {
    #[error("unrecognized timestamp: {0}")]
    Unparseable(String),

    #[error("local time does not exist in this timezone: {0}")]
    Nonexistent(String),
}

/// Normalize a caller-supplied timestamp to the configured zone.
///
/// An input with an explicit offset is converted to the zone (same instant,
/// normalized representation); a bare local timestamp gets the zone's
/// offset attached. Idempotent: normalizing an already-normalized value is
/// a no-op.
pub fn ensure_timezone(input: &str, tz: Tz) -> Result<DateTime<Tz>, TimeError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&tz));
    }

    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| TimeError::Unparseable(input.to_string()))?;

    resolve_local(naive, tz)
}

/// Attach a zone to a bare local timestamp.
///
/// An ambiguous local time (clocks rolled back) resolves to the earlier
/// offset; a nonexistent one (clocks jumped forward) is an error.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>, TimeError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier),
        LocalResult::None => Err(TimeError::Nonexistent(naive.to_string())),
    }
}

/// Midnight-to-midnight window containing `now` in its zone.
pub fn day_bounds(now: DateTime<Tz>) -> Result<(DateTime<Tz>, DateTime<Tz>), TimeError> {
    let tz = now.timezone();
    let today = now.date_naive();
    let tomorrow = today
        .succ_opt()
        .ok_or_else(|| TimeError::Unparseable(today.to_string()))?;

    let start = today
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| TimeError::Unparseable(today.to_string()))
        .and_then(|midnight| resolve_local(midnight, tz))?;
    let end = tomorrow
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| TimeError::Unparseable(tomorrow.to_string()))
        .and_then(|midnight| resolve_local(midnight, tz))?;

    Ok((start, end))
}

/// Expand a window symmetrically by a buffer.
pub fn expand_window(
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    buffer: Duration,
) -> (DateTime<Tz>, DateTime<Tz>) {
    (start - buffer, end + buffer)
}
