//! Client configuration: defaults, `config.toml`, environment overrides, and
//! the validated [`ClientConfig`] a client is built from.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::mask_token;
use crate::retry::DEFAULT_MAX_RETRIES;

/// Default Pincho API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.pincho.app/send";

/// Default per-attempt HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_TOKEN: &str = "PINCHO_TOKEN";
pub const ENV_API_URL: &str = "PINCHO_API_URL";
pub const ENV_TIMEOUT: &str = "PINCHO_TIMEOUT";
pub const ENV_MAX_RETRIES: &str = "PINCHO_MAX_RETRIES";

/// Settings loaded from `~/.config/pincho/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchoConfig {
    /// API token; usually left out of the file and supplied via `PINCHO_TOKEN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Endpoint notifications are POSTed to.
    pub api_url: String,
    /// Per-attempt HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after the first attempt (0 disables retrying).
    pub max_retries: u32,
}

impl Default for PinchoConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl PinchoConfig {
    /// Overlay `PINCHO_*` environment variables.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup` (an environment stand-in).
    ///
    /// Empty, unparseable, or out-of-range values are ignored: the timeout must
    /// be a positive integer, the retry count a non-negative one.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_TOKEN).filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.is_empty()) {
            self.api_url = url;
        }
        match lookup(ENV_TIMEOUT).map(|v| v.trim().parse::<i64>()) {
            Some(Ok(secs)) if secs > 0 => self.timeout_secs = secs as u64,
            Some(_) => tracing::debug!("ignoring invalid {ENV_TIMEOUT}"),
            None => {}
        }
        match lookup(ENV_MAX_RETRIES).map(|v| v.trim().parse::<i64>()) {
            Some(Ok(n)) if (0..=i64::from(u32::MAX)).contains(&n) => self.max_retries = n as u32,
            Some(_) => tracing::debug!("ignoring invalid {ENV_MAX_RETRIES}"),
            None => {}
        }
        self
    }

    /// Validate into a [`ClientConfig`].
    pub fn into_client_config(self) -> Result<ClientConfig, ConfigError> {
        let config = ClientConfig {
            token: self.token.unwrap_or_default(),
            api_url: self.api_url,
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Validated settings a client is built from.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub token: String,
    pub api_url: String,
    /// Per-attempt HTTP timeout.
    pub timeout: Duration,
    pub max_retries: u32,
}

impl ClientConfig {
    /// Defaults for everything except the token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Check token, URL and timeout. Called by every client constructor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        let parsed = url::Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidApiUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl {
                url: self.api_url.clone(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &mask_token(&self.token))
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pincho")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PinchoConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PinchoConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<PinchoConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PinchoConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let cfg = PinchoConfig::default();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_retries, 3);
        assert!(cfg.token.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = PinchoConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: PinchoConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let cfg: PinchoConfig = toml::from_str("max_retries = 0\n").unwrap();
        assert_eq!(cfg.max_retries, 0);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
                token = "abc12345"
                api_url = "http://127.0.0.1:9/send"
                timeout_secs = 5
                max_retries = 1
            "#,
        )
        .unwrap();
        let cfg = load_from(&path).unwrap();
        assert_eq!(cfg.token.as_deref(), Some("abc12345"));
        assert_eq!(cfg.timeout_secs, 5);
        let client = cfg.into_client_config().unwrap();
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.max_retries, 1);
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        assert!(load_from(&path).is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let cfg = PinchoConfig::default().apply_env_from(env(&[
            ("PINCHO_TOKEN", "env_token_123"),
            ("PINCHO_TIMEOUT", "60"),
            ("PINCHO_MAX_RETRIES", "10"),
            ("PINCHO_API_URL", "https://custom.example.com/api"),
        ]));
        assert_eq!(cfg.token.as_deref(), Some("env_token_123"));
        assert_eq!(cfg.timeout_secs, 60);
        assert_eq!(cfg.max_retries, 10);
        assert_eq!(cfg.api_url, "https://custom.example.com/api");
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let cfg = PinchoConfig::default().apply_env_from(env(&[
            ("PINCHO_TIMEOUT", "0"),
            ("PINCHO_MAX_RETRIES", "-1"),
            ("PINCHO_TOKEN", ""),
        ]));
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_retries, 3);
        assert!(cfg.token.is_none());

        let cfg = PinchoConfig::default()
            .apply_env_from(env(&[("PINCHO_TIMEOUT", "abc"), ("PINCHO_MAX_RETRIES", "x")]));
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_retries, 3);
    }

    #[test]
    fn zero_retries_from_env_is_allowed() {
        let cfg = PinchoConfig::default().apply_env_from(env(&[("PINCHO_MAX_RETRIES", "0")]));
        assert_eq!(cfg.max_retries, 0);
    }

    #[test]
    fn validation_errors() {
        assert_eq!(
            PinchoConfig::default().into_client_config().unwrap_err(),
            ConfigError::MissingToken
        );

        let mut c = ClientConfig::new("abc12345");
        c.api_url = String::new();
        assert_eq!(c.validate().unwrap_err(), ConfigError::EmptyApiUrl);

        c.api_url = "not a url".into();
        assert!(matches!(c.validate(), Err(ConfigError::InvalidApiUrl { .. })));

        c.api_url = "ftp://example.com/send".into();
        assert!(matches!(c.validate(), Err(ConfigError::InvalidApiUrl { .. })));

        let mut c = ClientConfig::new("abc12345");
        c.timeout = Duration::ZERO;
        assert_eq!(c.validate().unwrap_err(), ConfigError::ZeroTimeout);
    }

    #[test]
    fn debug_masks_token() {
        let c = ClientConfig::new("abc12345");
        let dbg = format!("{c:?}");
        assert!(dbg.contains("abc1..."));
        assert!(!dbg.contains("abc12345"));
    }
}
