//! Configuration handling for the client

use crate::api::ResponseShape;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "COVID_PREDICT_ENDPOINT";

/// User configuration; every field is optional in `config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the prediction service
    pub endpoint: Option<String>,
    /// Whole-request timeout
    pub request_timeout_secs: Option<u64>,
    /// Refuse to submit without a CT scan
    pub require_image: Option<bool>,
    /// Layout of successful prediction responses
    pub response_shape: Option<ResponseShape>,
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "covid-predict", "covid-predict-tui")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config dir, then apply the
    /// environment override
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env(std::env::var(ENDPOINT_ENV).ok());
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    fn apply_env(&mut self, endpoint: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!(%endpoint, "Endpoint overridden from environment");
            self.endpoint = Some(endpoint.trim().to_string());
        }
    }

    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn require_image(&self) -> bool {
        self.require_image.unwrap_or(true)
    }

    pub fn response_shape(&self) -> ResponseShape {
        self.response_shape.unwrap_or_default()
    }
}
