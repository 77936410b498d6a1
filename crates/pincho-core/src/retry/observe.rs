//! Hook for callers that need per-attempt history.

use std::time::Duration;

use crate::error::PushError;

/// Receives retry-loop events for one logical call.
///
/// The loop itself only reports the last error; implement this to record
/// every attempt. All methods default to no-ops.
pub trait RetryObserver: Send + Sync {
    /// An attempt (0-based) is about to start.
    fn on_attempt(&self, _attempt: u32) {}

    /// Attempt `attempt` failed and the loop will wait `delay` before the next one.
    fn on_retry(&self, _attempt: u32, _error: &PushError, _delay: Duration) {}

    /// Attempt `attempt` failed and the loop is returning `error` to the caller.
    fn on_give_up(&self, _attempt: u32, _error: &PushError) {}
}
