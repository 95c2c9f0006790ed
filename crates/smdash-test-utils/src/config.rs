//! Configuration builders and temporary config files for tests.

use std::path::{Path, PathBuf};

use smdash_config::AppConfig;
use tempfile::TempDir;

/// Fluent builder for [`AppConfig`] in tests.
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .base_url(&daemon.url())
///     .poll_interval_ms(300)
///     .request_timeout_ms(200)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.daemon.base_url = url.to_string();
        self
    }

    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.daemon.request_timeout_ms = ms;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll.interval_ms = ms;
        self
    }

    pub fn locale(mut self, locale: &str) -> Self {
        self.config.display.locale = locale.to_string();
        self
    }

    pub fn alert_window(mut self, n: usize) -> Self {
        self.config.display.alert_window = n;
        self
    }

    pub fn flash_ms(mut self, ms: u64) -> Self {
        self.config.display.flash_ms = ms;
        self
    }

    pub fn classifier_mode(mut self, mode: &str) -> Self {
        self.config.classifier.mode = mode.to_string();
        self
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.config.classifier.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A config file in a temp directory that is removed on drop.
pub struct TestConfigFile {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestConfigFile {
    /// Write `toml_content` to `smdash.toml` in a fresh temp directory.
    pub async fn with_toml(toml_content: &str) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("smdash.toml");
        tokio::fs::write(&path, toml_content)
            .await
            .expect("failed to write test config");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the file.
    pub async fn load(&self) -> AppConfig {
        AppConfig::load(&self.path)
            .await
            .expect("failed to parse test config")
    }
}
