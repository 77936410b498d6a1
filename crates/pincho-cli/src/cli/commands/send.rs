//! `pincho send` – build a notification and send it with retries.

use anyhow::{Context, Result};
use pincho_core::config::PinchoConfig;
use pincho_core::{CallControl, Notification, PinchoClient};

/// Arguments of `pincho send`, after parsing.
#[derive(Default)]
pub struct SendOptions {
    pub title: String,
    pub message: Option<String>,
    pub kind: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub action_url: Option<String>,
    pub encrypt_password: Option<String>,
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

impl SendOptions {
    /// Explicit flags win over file and environment.
    pub fn apply_overrides(&self, mut cfg: PinchoConfig) -> PinchoConfig {
        if let Some(token) = &self.token {
            cfg.token = Some(token.clone());
        }
        if let Some(url) = &self.api_url {
            cfg.api_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            cfg.timeout_secs = secs;
        }
        if let Some(n) = self.max_retries {
            cfg.max_retries = n;
        }
        cfg
    }

    pub fn notification(&self) -> Notification {
        let mut n = Notification::new(self.title.clone()).tags(self.tags.iter().cloned());
        if let Some(message) = &self.message {
            n = n.message(message.clone());
        }
        if let Some(kind) = &self.kind {
            n = n.kind(kind.clone());
        }
        if let Some(url) = &self.image_url {
            n = n.image_url(url.clone());
        }
        if let Some(url) = &self.action_url {
            n = n.action_url(url.clone());
        }
        if let Some(password) = &self.encrypt_password {
            n = n.encrypt_with(password.clone());
        }
        n
    }
}

pub async fn run_send(cfg: PinchoConfig, opts: SendOptions) -> Result<()> {
    let client_cfg = opts.apply_overrides(cfg).into_client_config()?;
    let client = PinchoClient::from_config(client_cfg)?;
    let notification = opts.notification();

    let control = CallControl::new();
    let on_interrupt = control.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling send");
            on_interrupt.cancel();
        }
    });

    let result = client.send(&notification, &control).await;
    watcher.abort();
    let response = result.context("send notification")?;

    match response {
        Some(r) if !r.message.is_empty() => println!("{}: {}", r.status, r.message),
        Some(r) => println!("{}", r.status),
        None => println!("sent"),
    }
    if let Some(rl) = client.rate_limit() {
        let reset = rl
            .time_until_reset()
            .map(|d| format!(", resets in {}s", d.as_secs()))
            .unwrap_or_default();
        println!("rate limit: {}/{} remaining{}", rl.remaining, rl.limit, reset);
    }
    Ok(())
}
