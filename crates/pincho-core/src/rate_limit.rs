//! Last observed API quota, taken from `RateLimit-*` response headers.
//!
//! The state is owned by the client value and updated after every
//! successful response. Concurrent callers sharing one client race on the
//! update; the last writer wins and readers may see a slightly stale value.

use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::transport::ResponseHeaders;

pub const HEADER_LIMIT: &str = "RateLimit-Limit";
pub const HEADER_REMAINING: &str = "RateLimit-Remaining";
pub const HEADER_RESET: &str = "RateLimit-Reset";

/// Quota as reported by the most recent successful response.
///
/// Fields whose header was missing or unparseable are zero (`reset` is the
/// Unix epoch); a snapshot is never merged with the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// Maximum requests per window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// When the window rolls over.
    pub reset: SystemTime,
}

impl RateLimitSnapshot {
    /// Build a snapshot if at least one of the three headers parses.
    pub fn from_headers(headers: &ResponseHeaders) -> Option<Self> {
        let limit = parse_count(headers.get(HEADER_LIMIT));
        let remaining = parse_count(headers.get(HEADER_REMAINING));
        // A reset too far out to represent counts as unparseable.
        let reset = parse_count(headers.get(HEADER_RESET))
            .and_then(|secs| UNIX_EPOCH.checked_add(Duration::from_secs(secs)));
        if limit.is_none() && remaining.is_none() && reset.is_none() {
            return None;
        }
        Some(Self {
            limit: limit.unwrap_or(0),
            remaining: remaining.unwrap_or(0),
            reset: reset.unwrap_or(UNIX_EPOCH),
        })
    }

    /// Time left until `reset`, or `None` if it is unknown or already past.
    pub fn time_until_reset(&self) -> Option<Duration> {
        if self.reset == UNIX_EPOCH {
            return None;
        }
        self.reset.duration_since(SystemTime::now()).ok()
    }

    /// Seconds since the Unix epoch at which the window resets (0 if unknown).
    pub fn reset_unix_secs(&self) -> u64 {
        self.reset
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

fn parse_count(value: Option<&str>) -> Option<u64> {
    value?.trim().parse::<u64>().ok()
}

/// Holder for the latest snapshot on a client.
#[derive(Debug, Default)]
pub struct RateLimitState {
    last: RwLock<Option<RateLimitSnapshot>>,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored snapshot if `headers` carry any quota header.
    /// Returns whether the snapshot was replaced.
    pub fn record(&self, headers: &ResponseHeaders) -> bool {
        let Some(snapshot) = RateLimitSnapshot::from_headers(headers) else {
            return false;
        };
        tracing::debug!(
            limit = snapshot.limit,
            remaining = snapshot.remaining,
            reset = snapshot.reset_unix_secs(),
            "rate limit updated"
        );
        let mut last = self.last.write().unwrap_or_else(|e| e.into_inner());
        *last = Some(snapshot);
        true
    }

    /// The current snapshot, or `None` if no response has carried quota headers yet.
    pub fn snapshot(&self) -> Option<RateLimitSnapshot> {
        *self.last.read().unwrap_or_else(|e| e.into_inner())
    }
}
