//! The push client: builds the request once, then drives one attempt per
//! retry-loop iteration and records quota headers on success.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ClientConfig, PinchoConfig};
use crate::control::CallControl;
use crate::error::{ConfigError, PushError};
use crate::logging::mask_token;
use crate::notification::{Notification, SendResponse};
use crate::rate_limit::{RateLimitSnapshot, RateLimitState};
use crate::retry::{classify_response, run_with_retry, RetryObserver, RetryPolicy};
use crate::transport::{self, HttpRequest, HttpResponse};

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("pincho-rust/", env!("CARGO_PKG_VERSION"));

/// Client for the Pincho push API.
///
/// Cheap to share behind an `Arc`; concurrent sends are independent except
/// for the rate-limit snapshot, where the last response to finish wins.
pub struct PinchoClient {
    config: ClientConfig,
    policy: RetryPolicy,
    rate_limit: RateLimitState,
    observer: Option<Arc<dyn RetryObserver>>,
}

impl PinchoClient {
    /// Start building a client for `token` with default settings.
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            config: ClientConfig::new(token),
            observer: None,
        }
    }

    /// Build from an already assembled configuration (validated again here).
    pub fn from_config(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(
            token = %mask_token(&config.token),
            api_url = %config.api_url,
            timeout_secs = config.timeout.as_secs(),
            max_retries = config.max_retries,
            "client created"
        );
        Ok(Self {
            policy: RetryPolicy::new(config.max_retries),
            config,
            rate_limit: RateLimitState::new(),
            observer: None,
        })
    }

    /// Defaults overlaid with `PINCHO_TOKEN`, `PINCHO_API_URL`,
    /// `PINCHO_TIMEOUT` and `PINCHO_MAX_RETRIES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_config(PinchoConfig::default().apply_env().into_client_config()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Quota reported by the most recent successful response, if any carried it.
    pub fn rate_limit(&self) -> Option<RateLimitSnapshot> {
        self.rate_limit.snapshot()
    }

    /// Send a title/message notification.
    pub async fn send_simple(
        &self,
        title: &str,
        message: &str,
        control: &CallControl,
    ) -> Result<Option<SendResponse>, PushError> {
        self.send(&Notification::simple(title, message), control).await
    }

    /// Send a notification, retrying transient failures.
    ///
    /// Returns the parsed success body, or `None` when the 2xx response had
    /// no parseable body. Validation happens before any request is made.
    pub async fn send(
        &self,
        notification: &Notification,
        control: &CallControl,
    ) -> Result<Option<SendResponse>, PushError> {
        tracing::debug!(title = %notification.title, "send called");
        let wire = notification.to_wire()?;
        let body = serde_json::to_vec(&wire).map_err(|e| {
            tracing::error!(error = %e, "failed to serialize request body");
            PushError::generic(format!("failed to marshal request: {e}"))
        })?;

        let body = body.as_slice();
        run_with_retry(&self.policy, control, self.observer.as_deref(), move |_| {
            self.attempt(body, control)
        })
        .await
    }

    /// One round trip: send, then classify the response.
    async fn attempt(
        &self,
        body: &[u8],
        control: &CallControl,
    ) -> Result<Option<SendResponse>, PushError> {
        let request = self.build_request(body.to_vec());
        let response = transport::execute(request, control, self.config.timeout).await?;
        self.handle_response(response)
    }

    fn build_request(&self, body: Vec<u8>) -> HttpRequest {
        HttpRequest {
            url: self.config.api_url.clone(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.config.token),
                ),
                ("User-Agent".to_string(), USER_AGENT.to_string()),
            ],
            body,
        }
    }

    fn handle_response(&self, response: HttpResponse) -> Result<Option<SendResponse>, PushError> {
        if response.status >= 400 {
            return Err(classify_response(
                response.status,
                &response.body,
                response.headers.get("Retry-After"),
            ));
        }

        self.rate_limit.record(&response.headers);

        match serde_json::from_slice::<SendResponse>(&response.body) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                tracing::debug!(status = response.status, error = %e, "success body not parseable");
                Ok(None)
            }
        }
    }
}

impl fmt::Debug for PinchoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinchoClient")
            .field("config", &self.config)
            .field("rate_limit", &self.rate_limit.snapshot())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Builder for [`PinchoClient`]; all validation happens in [`ClientBuilder::build`].
pub struct ClientBuilder {
    config: ClientConfig,
    observer: Option<Arc<dyn RetryObserver>>,
}

impl ClientBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Per-attempt HTTP timeout; must be positive.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Retries after the first attempt; 0 disables retrying.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Receive per-attempt retry events.
    pub fn observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> Result<PinchoClient, ConfigError> {
        let mut client = PinchoClient::from_config(self.config)?;
        client.observer = self.observer;
        Ok(client)
    }
}
