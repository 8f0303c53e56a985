//! Configuration management for the CLI

use crate::client::Routes;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Service URL used when neither the flag, the environment nor the config file set one
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
    /// Public endpoint paths, when the service renames them
    #[serde(default)]
    pub routes: Routes,
}

impl Config {
    /// Load configuration from `~/.config/csr/config.json`, if present
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Pick the API URL: explicit flag or env first, then the config file
    pub fn resolve_api_url(&self, cli_value: Option<String>) -> String {
        cli_value
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Apply per-route overrides from flags or env on top of the file
    pub fn resolve_routes(
        &self,
        health: Option<String>,
        predict: Option<String>,
        feedback: Option<String>,
    ) -> Routes {
        let routes = self.routes.clone();
        Routes {
            health: health.unwrap_or(routes.health),
            predict: predict.unwrap_or(routes.predict),
            feedback: feedback.unwrap_or(routes.feedback),
        }
    }

    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("csr").join("config.json"))
    }
}
