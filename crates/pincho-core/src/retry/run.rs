//! Retry loop: run an attempt until success, a terminal error, or cancellation.

use std::future::Future;

use crate::control::CallControl;
use crate::error::{ErrorKind, PushError};

use super::observe::RetryObserver;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs `attempt_fn` until it succeeds or the retry policy says to stop.
///
/// `attempt_fn` receives the 0-based attempt index. Between attempts the loop
/// waits for the backoff delay, racing it against `control`; if the caller
/// cancels (or the deadline passes) during the wait, the cancellation outcome
/// is returned instead of the pending HTTP error. Only the most recent error
/// is returned; earlier ones go to `observer` if one is supplied.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    control: &CallControl,
    observer: Option<&dyn RetryObserver>,
    mut attempt_fn: F,
) -> Result<T, PushError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, PushError>>,
{
    let mut attempt = 0u32;
    loop {
        control.check()?;
        if attempt > 0 {
            tracing::debug!(attempt, max_retries = policy.max_retries, "retry attempt");
        }
        if let Some(obs) = observer {
            obs.on_attempt(attempt);
        }

        let err = match attempt_fn(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        if err.is_cancellation() {
            return Err(err);
        }

        match policy.decide(attempt, &err) {
            RetryDecision::NoRetry => {
                if err.is_retryable() {
                    tracing::warn!(
                        max_retries = policy.max_retries,
                        error = %err,
                        "max retries exceeded"
                    );
                } else {
                    tracing::debug!(error = %err, "error not retryable");
                }
                if let Some(obs) = observer {
                    obs.on_give_up(attempt, &err);
                }
                return Err(err);
            }
            RetryDecision::RetryAfter(delay) => {
                let delay_ms = delay.as_millis() as u64;
                if err.kind() == Some(ErrorKind::RateLimit) {
                    tracing::warn!(
                        attempt,
                        delay_ms,
                        server_hint = err.retry_after().is_some(),
                        "rate limited, backing off"
                    );
                } else {
                    tracing::debug!(attempt, delay_ms, error = %err, "retryable error, backing off");
                }
                if let Some(obs) = observer {
                    obs.on_retry(attempt, &err, delay);
                }
                if let Err(cancel) = control.sleep(delay).await {
                    tracing::debug!(outcome = %cancel, "backoff wait interrupted");
                    return Err(cancel);
                }
                attempt += 1;
            }
        }
    }
}
