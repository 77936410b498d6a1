//! One HTTP round trip over libcurl.
//!
//! Uses the curl crate (libcurl) with a fresh easy handle per attempt, run on
//! tokio's blocking pool. The caller's cancellation token is polled from the
//! progress callback, so an in-flight request is aborted once it fires.

mod parse;

pub use parse::ResponseHeaders;

use std::str;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::control::CallControl;
use crate::error::PushError;

/// A fully built POST request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Status, headers and full body of the final response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: ResponseHeaders,
    pub body: Vec<u8>,
}

/// Performs the request once, honouring `control` and the per-attempt `timeout`.
///
/// Transport failures become [`PushError::Network`]; an abort caused by the
/// caller's token becomes [`PushError::Cancelled`], and a curl timeout that
/// coincides with the caller's deadline becomes [`PushError::DeadlineExceeded`].
/// Any HTTP status, including 4xx/5xx, is returned as `Ok`. Dropping the
/// returned future aborts the transfer.
pub async fn execute(
    request: HttpRequest,
    control: &CallControl,
    timeout: Duration,
) -> Result<HttpResponse, PushError> {
    control.check()?;
    // curl treats a zero timeout as "no timeout".
    let timeout = match control.remaining() {
        Some(left) => timeout.min(left),
        None => timeout,
    }
    .max(Duration::from_millis(1));
    // Child token: cancelled by the caller, or by the guard if this future is
    // dropped mid-transfer.
    let token = control.token().child_token();
    let _abort_on_drop = token.clone().drop_guard();

    let joined = tokio::task::spawn_blocking(move || perform(&request, &token, timeout)).await;
    let result = match joined {
        Ok(result) => result,
        Err(e) => return Err(PushError::network("transport task failed", e)),
    };

    result.map_err(|e| {
        if e.is_aborted_by_callback() && control.is_cancelled() {
            return PushError::Cancelled;
        }
        if e.is_operation_timedout() && control.remaining().is_some_and(|r| r.is_zero()) {
            return PushError::DeadlineExceeded;
        }
        let message = if e.is_recv_error() || e.is_read_error() || e.is_partial_file() {
            "failed to read response"
        } else {
            "request failed"
        };
        PushError::network(message, e)
    })
}

/// Blocking part: configure a curl easy handle, run it, collect the response.
fn perform(
    request: &HttpRequest,
    token: &CancellationToken,
    timeout: Duration,
) -> Result<HttpResponse, curl::Error> {
    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(&request.url)?;
    easy.post(true)?;
    easy.post_fields_copy(&request.body)?;
    easy.signal(false)?;
    easy.connect_timeout(timeout)?;
    easy.timeout(timeout)?;
    easy.progress(true)?;

    let mut list = curl::easy::List::new();
    for (k, v) in &request.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    // Never wait for `100 Continue`; the body is small.
    list.append("Expect:")?;
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                header_lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.progress_function(|_, _, _, _| !token.is_cancelled())?;
        transfer.perform()?;
    }

    let status = easy.response_code()? as u16;
    Ok(HttpResponse {
        status,
        headers: ResponseHeaders::from_lines(&header_lines),
        body,
    })
}
