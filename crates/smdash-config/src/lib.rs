#![deny(unsafe_code)]

//! Configuration loading and validation for smdash.
//!
//! Loads TOML configuration files and validates them. [`AppConfig`] is the
//! central configuration structure shared by the CLI, the TUI and the core
//! polling engine.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the monitoring daemon lives.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Polling cadence.
    #[serde(default)]
    pub poll: PollConfig,

    /// Display behaviour of the rendered regions.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Log-entry failure classification.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the SecureMonitor daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Base URL of the daemon's HTTP API (without the `/api/...` path).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout_ms() -> u64 {
    4000
}

/// Polling timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Interval between snapshot fetches, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    5000
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Language tag for labels and relative times ("es", "en").
    ///
    /// Unsupported tags fall back to Spanish labels with numeric relative
    /// times such as `hace 5min`.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Maximum number of alert rows shown at once.
    #[serde(default = "default_alert_window")]
    pub alert_window: usize,

    /// How long the log feed stays highlighted after a new failure (ms).
    #[serde(default = "default_flash_ms")]
    pub flash_ms: u64,

    /// Distance from the bottom (in rows) still treated as "pinned".
    #[serde(default = "default_scroll_tolerance")]
    pub scroll_tolerance: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            alert_window: default_alert_window(),
            flash_ms: default_flash_ms(),
            scroll_tolerance: default_scroll_tolerance(),
        }
    }
}

fn default_locale() -> String {
    "es".to_string()
}

fn default_alert_window() -> usize {
    50
}

fn default_flash_ms() -> u64 {
    2000
}

fn default_scroll_tolerance() -> usize {
    8
}

/// How log entries are classified as failure signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// "keyword" or "severity-first".
    #[serde(default = "default_classifier_mode")]
    pub mode: String,

    /// Lower-case substrings that mark a normalized line as a failure.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: default_classifier_mode(),
            keywords: default_keywords(),
        }
    }
}

fn default_classifier_mode() -> String {
    "keyword".to_string()
}

/// Keyword set used by the heuristic failure classifier.
pub fn default_keywords() -> Vec<String> {
    ["error", "failed", "fail ", "critical", "denied", "block"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file. The TUI only logs when this is set.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const MIN_INTERVAL_MS: u64 = 250;

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_unvalidated(path).await?;
        config.validate()?;
        Ok(config)
    }

    /// Read and deserialize a TOML file without validating it, so callers
    /// can apply overrides first and then call [`AppConfig::validate`].
    pub async fn load_unvalidated(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml_unvalidated(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config = Self::from_toml_unvalidated(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Deserialize a TOML string, leaving validation to the caller.
    pub fn from_toml_unvalidated(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.daemon.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "daemon.base_url must start with http:// or https://, got {:?}",
                self.daemon.base_url
            )));
        }
        if self.poll.interval_ms < MIN_INTERVAL_MS {
            return Err(ConfigError::Validation(format!(
                "poll.interval_ms must be at least {MIN_INTERVAL_MS}, got {}",
                self.poll.interval_ms
            )));
        }
        if self.daemon.request_timeout_ms == 0
            || self.daemon.request_timeout_ms >= self.poll.interval_ms
        {
            return Err(ConfigError::Validation(format!(
                "daemon.request_timeout_ms must be in 1..{}, got {}",
                self.poll.interval_ms, self.daemon.request_timeout_ms
            )));
        }
        if self.display.alert_window == 0 {
            return Err(ConfigError::Validation(
                "display.alert_window must be at least 1".to_string(),
            ));
        }
        if self.display.flash_ms == 0 {
            return Err(ConfigError::Validation(
                "display.flash_ms must be non-zero".to_string(),
            ));
        }

        let valid_modes = ["keyword", "severity-first"];
        if !valid_modes.contains(&self.classifier.mode.as_str()) {
            return Err(ConfigError::Validation(format!(
                "classifier.mode must be one of {:?}, got {:?}",
                valid_modes, self.classifier.mode
            )));
        }
        if self.classifier.keywords.is_empty() {
            return Err(ConfigError::Validation(
                "classifier.keywords must not be empty".to_string(),
            ));
        }
        for (i, keyword) in self.classifier.keywords.iter().enumerate() {
            if keyword.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "classifier.keywords[{i}] must not be empty"
                )));
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation(
                "logging.level must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Polling interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    /// Per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.daemon.request_timeout_ms)
    }

    /// Log-feed highlight duration as a [`Duration`].
    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.display.flash_ms)
    }
}
