//! Service configuration
//!
//! Sources, later ones winning: an optional config file (`SCORER_CONFIG`,
//! default basename `scorer`), then `SCORER_*` environment variables with
//! `__` separating nested keys, e.g. `SCORER_MODEL__DATASET_PATH`.

use anyhow::{bail, Context, Result};
use scoring_lib::ModelConfig;
use serde::Deserialize;

/// Environment variable naming the optional config file
pub const CONFIG_PATH_ENV: &str = "SCORER_CONFIG";

/// Scoring service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listener host
    #[serde(default = "default_host")]
    pub host: String,

    /// Listener port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Instance name attached to structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    #[serde(default)]
    pub routes: RoutesConfig,

    #[serde(default)]
    pub model: ModelConfig,
}

/// Paths of the three public endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_health_path")]
    pub health: String,

    #[serde(default = "default_predict_path")]
    pub predict: String,

    #[serde(default = "default_feedback_path")]
    pub feedback: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "credit-scorer".to_string())
}

fn default_health_path() -> String {
    "/hackathon".to_string()
}

fn default_predict_path() -> String {
    "/predict_creditscore".to_string()
}

fn default_feedback_path() -> String {
    "/feedback_loop".to_string()
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            health: default_health_path(),
            predict: default_predict_path(),
            feedback: default_feedback_path(),
        }
    }
}

impl RoutesConfig {
    /// Operator endpoints that the public routes may not shadow
    pub const RESERVED: [&'static str; 4] = ["/model_info", "/healthz", "/readyz", "/metrics"];

    fn validate(&self) -> Result<()> {
        let paths = [&self.health, &self.predict, &self.feedback];
        for (idx, path) in paths.iter().enumerate() {
            if !path.starts_with('/') {
                bail!("route {:?} must start with '/'", path);
            }
            if Self::RESERVED.contains(&path.as_str()) {
                bail!("route {:?} is reserved", path);
            }
            if paths[..idx].contains(path) {
                bail!("route {:?} is configured twice", path);
            }
        }
        Ok(())
    }
}

impl ServerConfig {
    /// Load configuration from the optional file and the environment
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "scorer".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix("SCORER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let config: Self = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid scorer configuration")?;
        config.routes.validate()?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
