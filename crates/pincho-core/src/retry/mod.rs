//! Retry and backoff policy.
//!
//! This module holds the error classification for HTTP responses, the fixed
//! backoff schedule, and the cancellation-aware retry loop, so the client
//! only has to supply "perform one attempt".

mod classify;
mod observe;
mod policy;
mod run;

pub use classify::{classify_http_status, classify_response, error_message, parse_retry_after};
pub use observe::RetryObserver;
pub use policy::{backoff_delay, RetryDecision, RetryPolicy, DEFAULT_MAX_RETRIES, MAX_BACKOFF};
pub use run::run_with_retry;
