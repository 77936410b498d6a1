//! Client library for the Pincho push notification API.
//!
//! The interesting part is the send pipeline: a cancellation-aware retry loop
//! ([`retry::run_with_retry`]) around a single-attempt curl transport, driven
//! by a fixed error taxonomy ([`PushError`] / [`ErrorKind`]) and backoff
//! schedule. Everything else (tags, encryption, config) prepares the request.

pub mod client;
pub mod config;
pub mod control;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod notification;
pub mod rate_limit;
pub mod retry;
pub mod tags;
pub mod transport;

pub use client::{ClientBuilder, PinchoClient, USER_AGENT};
pub use config::{ClientConfig, PinchoConfig};
pub use control::CallControl;
pub use error::{ConfigError, ErrorKind, PushError};
pub use notification::{Notification, SendResponse};
pub use rate_limit::RateLimitSnapshot;
pub use retry::RetryObserver;
