//! `pincho config` – show where settings live and what is in effect.

use anyhow::Result;
use pincho_core::config::{self, PinchoConfig};
use pincho_core::logging::mask_token;

pub fn run_config(cfg: &PinchoConfig) -> Result<()> {
    println!("config file: {}", config::config_path()?.display());
    let token = cfg
        .token
        .as_deref()
        .map(mask_token)
        .unwrap_or_else(|| "(not set)".to_string());
    println!("{:<12} {}", "token", token);
    println!("{:<12} {}", "api_url", cfg.api_url);
    println!("{:<12} {}s", "timeout", cfg.timeout_secs);
    println!("{:<12} {}", "max_retries", cfg.max_retries);
    Ok(())
}
