//! Classify HTTP error responses into push error kinds.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ErrorKind, PushError};

/// Error envelope returned by the API:
/// `{"status":"error","error":{"type":..,"code":..,"message":..,"param":..}}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default, rename = "type")]
    _kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    param: Option<String>,
}

/// Map a status code (>= 400) to its error kind.
pub fn classify_http_status(code: u16) -> ErrorKind {
    match code {
        400 => ErrorKind::Validation,
        401 | 403 => ErrorKind::Auth,
        429 => ErrorKind::RateLimit,
        500..=599 => ErrorKind::Server,
        _ => ErrorKind::Generic,
    }
}

/// Build the error message for a failed response.
///
/// Prefers `error.message` from the structured body, suffixed with
/// `(parameter: ..)` and `[code]` when present; otherwise the raw body text.
pub fn error_message(body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        let detail = envelope.error;
        if let Some(message) = detail.message.filter(|m| !m.is_empty()) {
            let mut out = message;
            if let Some(param) = detail.param.filter(|p| !p.is_empty()) {
                out = format!("{out} (parameter: {param})");
            }
            if let Some(code) = detail.code.filter(|c| !c.is_empty()) {
                out = format!("{out} [{code}]");
            }
            return out;
        }
    }
    String::from_utf8_lossy(body).into_owned()
}

/// Parse a `Retry-After` value in seconds.
///
/// Missing, non-numeric, zero, and negative values all yield `None`.
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    let secs = value?.trim().parse::<i64>().ok()?;
    if secs > 0 {
        Some(Duration::from_secs(secs as u64))
    } else {
        None
    }
}

/// Classify an HTTP error response into a [`PushError`].
///
/// `retry_after` is the raw `Retry-After` header value; it only matters for 429.
pub fn classify_response(status: u16, body: &[u8], retry_after: Option<&str>) -> PushError {
    let message = error_message(body);
    match classify_http_status(status) {
        ErrorKind::Validation => PushError::Validation {
            message,
            status: Some(status),
        },
        ErrorKind::Auth => PushError::Auth { message, status },
        ErrorKind::RateLimit => PushError::RateLimit {
            message,
            status,
            retry_after: parse_retry_after(retry_after),
        },
        ErrorKind::Server => PushError::Server { message, status },
        ErrorKind::Network | ErrorKind::Generic => PushError::Generic {
            message,
            status: Some(status),
        },
    }
}
