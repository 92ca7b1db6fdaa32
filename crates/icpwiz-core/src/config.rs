//! Client configuration persistence
//!
//! Stored in `<data_dir>/config.json`; the backend origin can be overridden
//! with `VITE_API_URL` or a CLI flag.

use crate::error::{CoreError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Backend origin used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Environment variable overriding the backend origin
pub const API_URL_ENV: &str = "VITE_API_URL";

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "ICPWIZ_HOME";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Backend origin, without trailing slash
    pub api_url: String,

    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    pub const FILE_NAME: &'static str = "config.json";

    /// Load from `<data_dir>/config.json`.
    /// Returns defaults on any I/O or parse error (graceful degradation).
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(Self::FILE_NAME);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist to `<data_dir>/config.json`.
    pub fn save(&self, data_dir: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(data_dir).context("Failed to create data directory for config")?;
        let path = data_dir.join(Self::FILE_NAME);
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Apply `VITE_API_URL` when set
    pub fn with_env(self) -> Self {
        self.with_api_url(std::env::var(API_URL_ENV).ok())
    }

    /// Override the backend origin; blank values are ignored
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }

    /// Normalize and check the configuration
    pub fn validated(mut self) -> Result<Self> {
        let trimmed = self.api_url.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "API URL is empty".to_string(),
            });
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(CoreError::InvalidConfig {
                message: format!("API URL must start with http:// or https:// (got '{}')", trimmed),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::InvalidConfig {
                message: "request timeout must be at least 1 second".to_string(),
            });
        }
        self.api_url = trimmed;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `<platform data dir>/icpwiz`
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("icpwiz"))
        .ok_or(CoreError::DataDirNotFound)
}
