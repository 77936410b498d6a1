//! CLI for the Pincho push notification client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pincho_core::config::{self, PinchoConfig};

use commands::{run_config, run_send, SendOptions};

/// Top-level CLI for Pincho.
#[derive(Debug, Parser)]
#[command(name = "pincho")]
#[command(about = "Send push notifications through the Pincho API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Send a notification. Ctrl-C cancels, including during retry waits.
    Send {
        /// Notification title.
        title: String,

        /// Notification body.
        message: Option<String>,

        /// Notification category (e.g. alert, deploy).
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        kind: Option<String>,

        /// Tag to attach; repeat for several. Normalized and capped at 10.
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Image shown with the notification.
        #[arg(long)]
        image_url: Option<String>,

        /// URL opened when the notification is tapped.
        #[arg(long)]
        action_url: Option<String>,

        /// Encrypt title, message and URLs with this password.
        #[arg(long, value_name = "PASSWORD")]
        encrypt_password: Option<String>,

        /// API token (overrides PINCHO_TOKEN and the config file).
        #[arg(long)]
        token: Option<String>,

        /// API endpoint (overrides PINCHO_API_URL and the config file).
        #[arg(long)]
        api_url: Option<String>,

        /// Per-attempt timeout in seconds.
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,

        /// Retries after the first attempt (0 disables retrying).
        #[arg(long, value_name = "N")]
        max_retries: Option<u32>,
    },

    /// Show the config file path and effective settings (token masked).
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = file_config_or_default(config::load_or_init()).apply_env();
        tracing::debug!(
            api_url = %cfg.api_url,
            timeout_secs = cfg.timeout_secs,
            max_retries = cfg.max_retries,
            "loaded config"
        );

        match cli.command {
            CliCommand::Send {
                title,
                message,
                kind,
                tags,
                image_url,
                action_url,
                encrypt_password,
                token,
                api_url,
                timeout,
                max_retries,
            } => {
                let opts = SendOptions {
                    title,
                    message,
                    kind,
                    tags,
                    image_url,
                    action_url,
                    encrypt_password,
                    token,
                    api_url,
                    timeout_secs: timeout,
                    max_retries,
                };
                run_send(cfg, opts).await?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

/// The config file is optional: env and flags still apply when it cannot be
/// read or created.
fn file_config_or_default(loaded: Result<PinchoConfig>) -> PinchoConfig {
    loaded.unwrap_or_else(|e| {
        tracing::warn!("config file unavailable, using defaults: {e:#}");
        PinchoConfig::default()
    })
}

#[cfg(test)]
mod tests;
