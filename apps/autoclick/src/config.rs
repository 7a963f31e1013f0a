//! # Configuration
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. TOML file: `--config <path>`, else `autoclick.toml` in the working
//!    directory when present
//! 3. Environment: `AUTOCLICK_URL`
//! 4. Command line: `--backend`
//!
//! ```toml
//! backend_url = "http://localhost:5000/api"
//! poll_interval_ms = 1000
//! autosave_debounce_ms = 1500
//! request_timeout_secs = 10
//! ```

use crate::client::DEFAULT_BACKEND_URL;
use crate::error::CliError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "autoclick.toml";

/// Environment variable overriding the backend URL.
pub const BACKEND_URL_ENV: &str = "AUTOCLICK_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the drawing service, including the `/api` prefix.
    pub backend_url: String,
    /// Status and file polling interval.
    pub poll_interval_ms: u64,
    /// Quiet period before `watch` pushes a changed file.
    pub autosave_debounce_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            poll_interval_ms: 1000,
            autosave_debounce_ms: 1500,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Resolve the effective configuration from every source.
    pub fn load(explicit: Option<&Path>, backend: Option<&str>) -> Result<Self, CliError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_backend(std::env::var(BACKEND_URL_ENV).ok().as_deref());
        config.apply_backend(backend);
        config.validate()?;

        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Read a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("Cannot read config '{}': {}", path.display(), e)))?;
        Self::from_toml_str(&text)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CliError> {
        toml::from_str(text).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Override the backend URL when a non-empty value is given.
    pub fn apply_backend(&mut self, url: Option<&str>) {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.backend_url = url.to_string();
        }
    }

    fn validate(&self) -> Result<(), CliError> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://"))
        {
            return Err(CliError::Config(format!(
                "backend_url must be an http(s) URL, got '{}'",
                self.backend_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(CliError::Config("poll_interval_ms must be > 0".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
