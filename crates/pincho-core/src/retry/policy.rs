use std::time::Duration;

use crate::error::{ErrorKind, PushError};

/// Upper bound on any single backoff wait.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base wait for rate-limit backoff without a server hint.
const RATE_LIMIT_BASE_SECS: u64 = 5;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Retry budget plus the fixed backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Decide what to do after attempt `attempt` (0-based) failed with `err`.
    pub fn decide(&self, attempt: u32, err: &PushError) -> RetryDecision {
        if attempt >= self.max_retries {
            return RetryDecision::NoRetry;
        }
        let Some(kind) = err.kind() else {
            return RetryDecision::NoRetry;
        };
        match backoff_delay(kind, attempt, err.retry_after()) {
            Some(delay) => RetryDecision::RetryAfter(delay),
            None => RetryDecision::NoRetry,
        }
    }

    /// Total attempts a call may make (first attempt plus retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Wait before the next attempt, given the attempt (0-based) that just failed.
///
/// - Network / Server: `2^attempt` seconds.
/// - RateLimit with a positive hint: the hint.
/// - RateLimit without a hint: `5 * 2^attempt` seconds.
///
/// Everything is capped at [`MAX_BACKOFF`]. Non-retryable kinds yield `None`.
pub fn backoff_delay(kind: ErrorKind, attempt: u32, hint: Option<Duration>) -> Option<Duration> {
    let delay = match kind {
        ErrorKind::Network | ErrorKind::Server => exp_secs(1, attempt),
        ErrorKind::RateLimit => match hint.filter(|h| !h.is_zero()) {
            Some(h) => h,
            None => exp_secs(RATE_LIMIT_BASE_SECS, attempt),
        },
        ErrorKind::Validation | ErrorKind::Auth | ErrorKind::Generic => return None,
    };
    Some(delay.min(MAX_BACKOFF))
}

/// `base * 2^attempt` seconds, saturating well past the cap.
fn exp_secs(base: u64, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.min(16);
    Duration::from_secs(base.saturating_mul(factor))
}
