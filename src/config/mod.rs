use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "CERT_STATUS_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config/cert-status.yaml";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General configuration
    #[serde(default)]
    pub general: GeneralConfig,

    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Status collection configuration
    #[serde(default)]
    pub status: StatusConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Emit logs as JSON
    #[serde(default)]
    pub structured_logging: bool,
}

/// Status collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Secret data key holding the signed certificate
    pub certificate_key: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            certificate_key: "tls.crt".to_string(),
        }
    }
}

/// Load configuration from the file named by `CERT_STATUS_CONFIG`
pub fn load_config() -> Result<Settings> {
    let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config_from(&config_path)
}

/// Load configuration from a YAML file and environment variables
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());

    let config_str = fs::read_to_string(path)
        .context(format!("Failed to read config file: {}", path.display()))?;

    let mut config: Settings = serde_yaml::from_str(&config_str)
        .context("Failed to parse YAML configuration")?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Apply environment variable overrides to configuration
fn apply_env_overrides(config: &mut Settings) {
    if let Ok(level) = env::var("CERT_STATUS_LOG_LEVEL") {
        config.general.log_level = level;
    }

    if let Ok(key) = env::var("CERT_STATUS_CERTIFICATE_KEY") {
        config.status.certificate_key = key;
    }
}

/// Validate configuration values
fn validate_config(config: &Settings) -> Result<()> {
    if config.status.certificate_key.is_empty() {
        return Err(anyhow::anyhow!("Certificate key cannot be empty"));
    }

    let level = config.general.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(anyhow::anyhow!("Unknown log level: {}", config.general.log_level));
    }

    Ok(())
}
