//! Error taxonomy for the push client.
//!
//! Every failed attempt is mapped to exactly one [`PushError`] variant. The
//! six HTTP/transport-derived variants correspond one-to-one with
//! [`ErrorKind`], whose retryability is fixed. Cancellation and deadline
//! expiry are separate terminal variants with no kind, so callers can always
//! tell them apart from anything the server said.

use std::time::Duration;

use thiserror::Error;

/// Boxed transport cause attached to network failures (kept for diagnostics only).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Closed set of error kinds. Retryability is a constant of the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing required field, malformed local input, or HTTP 400.
    Validation,
    /// HTTP 401 / 403.
    Auth,
    /// HTTP 429.
    RateLimit,
    /// HTTP 5xx.
    Server,
    /// Connection, DNS, or body-read failure.
    Network,
    /// Any other non-2xx status, or a local failure such as encryption.
    Generic,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::Validation,
        ErrorKind::Auth,
        ErrorKind::RateLimit,
        ErrorKind::Server,
        ErrorKind::Network,
        ErrorKind::Generic,
    ];

    /// Whether an error of this kind may be retried by the orchestrator.
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimit | ErrorKind::Server | ErrorKind::Network
        )
    }
}

/// Terminal outcome of a failed logical call (or a single failed attempt).
#[derive(Debug, Error)]
pub enum PushError {
    #[error("validation error: {message}{}", status_suffix(.status))]
    Validation { message: String, status: Option<u16> },

    #[error("auth error: {message} (status: {status})")]
    Auth { message: String, status: u16 },

    #[error("rate limit error: {message} (status: {status})")]
    RateLimit {
        message: String,
        status: u16,
        /// Server-supplied `Retry-After` hint, already validated as positive.
        retry_after: Option<Duration>,
    },

    #[error("server error: {message} (status: {status})")]
    Server { message: String, status: u16 },

    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("{message}{}", status_suffix(.status))]
    Generic { message: String, status: Option<u16> },

    /// The caller's cancellation token fired.
    #[error("call cancelled")]
    Cancelled,

    /// The caller's deadline passed before the call completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status: {code})"),
        None => String::new(),
    }
}

impl PushError {
    /// Local input problem; never sent, never retried.
    pub fn validation(message: impl Into<String>) -> Self {
        PushError::Validation {
            message: message.into(),
            status: None,
        }
    }

    /// Local non-HTTP failure (e.g. encryption, serialization).
    pub fn generic(message: impl Into<String>) -> Self {
        PushError::Generic {
            message: message.into(),
            status: None,
        }
    }

    pub fn network(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        PushError::Network {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Kind of this error, or `None` for cancellation / deadline expiry.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PushError::Validation { .. } => Some(ErrorKind::Validation),
            PushError::Auth { .. } => Some(ErrorKind::Auth),
            PushError::RateLimit { .. } => Some(ErrorKind::RateLimit),
            PushError::Server { .. } => Some(ErrorKind::Server),
            PushError::Network { .. } => Some(ErrorKind::Network),
            PushError::Generic { .. } => Some(ErrorKind::Generic),
            PushError::Cancelled | PushError::DeadlineExceeded => None,
        }
    }

    /// Retryability comes only from the kind; cancellation is never retryable.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_some_and(ErrorKind::is_retryable)
    }

    /// True for [`PushError::Cancelled`] and [`PushError::DeadlineExceeded`].
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PushError::Cancelled | PushError::DeadlineExceeded)
    }

    /// HTTP status that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PushError::Validation { status, .. } | PushError::Generic { status, .. } => *status,
            PushError::Auth { status, .. }
            | PushError::RateLimit { status, .. }
            | PushError::Server { status, .. } => Some(*status),
            PushError::Network { .. } | PushError::Cancelled | PushError::DeadlineExceeded => None,
        }
    }

    /// Human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            PushError::Validation { message, .. }
            | PushError::Auth { message, .. }
            | PushError::RateLimit { message, .. }
            | PushError::Server { message, .. }
            | PushError::Network { message, .. }
            | PushError::Generic { message, .. } => message,
            PushError::Cancelled => "call cancelled",
            PushError::DeadlineExceeded => "deadline exceeded",
        }
    }

    /// Server `Retry-After` hint carried by a rate-limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            PushError::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Invalid client configuration, reported before any request is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("token is required (set PINCHO_TOKEN or pass one explicitly)")]
    MissingToken,

    #[error("API URL cannot be empty")]
    EmptyApiUrl,

    #[error("invalid API URL {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("timeout must be positive")]
    ZeroTimeout,
}
