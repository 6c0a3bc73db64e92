//! Backoff for rate-limited requests

use std::time::Duration;

use rand::Rng;

/// Exponential backoff with jitter, applied to HTTP 429 responses only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry (default: 5s)
    pub initial_delay: Duration,
    /// Upper bound for any single delay (default: 600s)
    pub max_delay: Duration,
    /// Retries after the first attempt (default: 5)
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(600),
            max_retries: 5,
        }
    }
}

impl RetryPolicy {
    /// Never retry
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Upper bound of the delay before retry number `retry` (0-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// Jittered delay in `[backoff / 2, backoff]`
    pub fn delay(&self, retry: u32) -> Duration {
        let full = self.backoff(retry).as_millis() as u64;
        let half = full / 2;
        Duration::from_millis(rand::thread_rng().gen_range(half..=full))
    }
}
