//! Retry policy for remote calendar calls.
//!
//! Exponential backoff with a per-attempt cap and random jitter. The
//! deterministic part (`backoff`) is kept separate from the jitter so the
//! schedule stays testable.

use rand::Rng;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_DELAY_MS: u64 = 8_000;

/// Retry configuration, overridable per client instance.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per operation, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt (doubles each attempt)
    pub base_delay: Duration,

    /// Per-attempt delay cap
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// Deterministic zero-delay schedule for tests and embedding hosts that
    /// impose their own pacing.
    pub fn zero_delay(max_attempts: u32) -> Self {
        Self::new(max_attempts, 0, 0)
    }

    /// Backoff before the attempt following `attempts_made` failed attempts.
    ///
    /// Grows as `base * 2^(attempts_made - 1)`, capped at `max_delay`.
    pub fn backoff(&self, attempts_made: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempts_made.saturating_sub(1));
        let delay_ms = (self.base_delay.as_millis() as u64).saturating_mul(factor);
        let capped = delay_ms.min(self.max_delay.as_millis() as u64);
        Duration::from_millis(capped)
    }

    /// Add random jitter in `[0, delay/2]` to spread out retry storms.
    pub fn jittered(&self, delay: Duration) -> Duration {
        let half = delay.as_millis() as u64 / 2;
        let extra = rand::rng().random_range(0..=half);
        delay + Duration::from_millis(extra)
    }
}
