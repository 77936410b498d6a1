//! Minimal HTTP/1.1 server for integration tests that replays a script of replies.
//!
//! Each incoming request gets the next reply in the script; the last reply
//! repeats once the script is exhausted. Every request is recorded with its
//! arrival time, headers and body so tests can assert on attempt counts and
//! backoff gaps.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// One scripted response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// Wait this long before answering (simulates a slow server).
    pub delay: Duration,
}

impl Reply {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn ok() -> Self {
        Self::new(200).body(r#"{"status":"success","message":"Notification sent"}"#)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request as seen by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub at: Instant,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

/// Handle to a running server. The server runs until the process exits.
pub struct PushServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    disconnects: Arc<Mutex<Vec<Instant>>>,
}

impl PushServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Times at which a client hung up while a delayed reply was pending.
    pub fn disconnects(&self) -> Vec<Instant> {
        self.disconnects.lock().unwrap().clone()
    }

    /// Time between the arrival of request `i` and request `i + 1`.
    pub fn gap(&self, i: usize) -> Duration {
        let reqs = self.requests();
        reqs[i + 1].at.duration_since(reqs[i].at)
    }
}

/// Starts a server in a background thread answering with `script`.
pub fn start(script: Vec<Reply>) -> PushServer {
    assert!(!script.is_empty(), "script needs at least one reply");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let script = Arc::new(script);
    let next = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let disconnects = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    let hangups = Arc::clone(&disconnects);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let script = Arc::clone(&script);
            let next = Arc::clone(&next);
            let recorded = Arc::clone(&recorded);
            let hangups = Arc::clone(&hangups);
            thread::spawn(move || handle(stream, &script, &next, &recorded, &hangups));
        }
    });
    PushServer {
        url: format!("http://127.0.0.1:{}/send", port),
        requests,
        disconnects,
    }
}

/// URL of a port nothing listens on.
pub fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/send", port)
}

fn handle(
    mut stream: TcpStream,
    script: &[Reply],
    next: &AtomicUsize,
    recorded: &Mutex<Vec<RecordedRequest>>,
    hangups: &Mutex<Vec<Instant>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    recorded.lock().unwrap().push(request);

    let idx = next.fetch_add(1, Ordering::SeqCst).min(script.len() - 1);
    let reply = &script[idx];
    if !reply.delay.is_zero() && client_hung_up(&mut stream, reply.delay) {
        hangups.lock().unwrap().push(Instant::now());
        return;
    }

    let mut head = format!(
        "HTTP/1.1 {} Scripted\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    for (k, v) in &reply.headers {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(reply.body.as_bytes());
}

/// Waits up to `delay`, watching for EOF. Returns true if the client closed first.
fn client_hung_up(stream: &mut TcpStream, delay: Duration) -> bool {
    let until = Instant::now() + delay;
    let _ = stream.set_read_timeout(Some(Duration::from_millis(50)));
    let mut buf = [0u8; 64];
    while Instant::now() < until {
        match stream.read(&mut buf) {
            Ok(0) => return true,
            Ok(_) => {}
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) => {}
            Err(_) => return true,
        }
    }
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    false
}

/// Reads head and `Content-Length` body. Returns None on malformed input.
fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };
    let at = Instant::now();

    let head = std::str::from_utf8(&data[..head_end]).ok()?;
    let mut lines = head.split("\r\n");
    let method = lines.next()?.split_whitespace().next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = data[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }

    Some(RecordedRequest {
        at,
        method,
        headers,
        body,
    })
}
