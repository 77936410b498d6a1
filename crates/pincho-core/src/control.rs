//! Call control for cancel/deadline: the signal a caller hands to each send.
//!
//! A [`CallControl`] wraps a cancellation token and an optional deadline. The
//! retry loop races its backoff wait against both, and the transport polls
//! the same token from curl's progress callback so an in-flight request is
//! aborted too.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::PushError;

/// Cancellation signal plus optional deadline for one logical call.
#[derive(Debug, Clone, Default)]
pub struct CallControl {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallControl {
    /// A control that never fires unless [`CallControl::cancel`] is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing token (e.g. a child of an application-wide shutdown token).
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Fail the call with [`PushError::DeadlineExceeded`] at `deadline`.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Convenience for `deadline(Instant::now() + timeout)`.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    /// Request cancellation. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline_at(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// The terminal error if the call should stop now, checking cancellation first.
    pub fn check(&self) -> Result<(), PushError> {
        if self.is_cancelled() {
            return Err(PushError::Cancelled);
        }
        if self.remaining().is_some_and(|r| r.is_zero()) {
            return Err(PushError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Sleep for `delay`, returning early with the cancellation outcome if the
    /// token fires or the deadline passes first.
    pub async fn sleep(&self, delay: Duration) -> Result<(), PushError> {
        self.check()?;
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at.into()).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            _ = self.token.cancelled() => Err(PushError::Cancelled),
            _ = deadline => Err(PushError::DeadlineExceeded),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
