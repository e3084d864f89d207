//! Configuration loading, validation, and management for SmartSpend.
//!
//! Loads configuration from `~/.smartspend/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.smartspend/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Predictor (regression model) configuration
    #[serde(default)]
    pub predictor: PredictorConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Allocation engine configuration
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Which backend to use: "baseline" (built-in table) or "http"
    /// (remote model service).
    #[serde(default = "default_predictor_kind")]
    pub kind: String,

    /// Base URL of the model service (required for kind = "http").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Request timeout for the model service, in seconds.
    #[serde(default = "default_predictor_timeout")]
    pub timeout_secs: u64,
}

fn default_predictor_kind() -> String {
    "baseline".into()
}
fn default_predictor_timeout() -> u64 {
    15
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            kind: default_predictor_kind(),
            url: None,
            timeout_secs: default_predictor_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Extra CORS origins allowed besides same-origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    5050
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: vec![],
        }
    }
}

/// Allocation engine tables. Everything here is optional: the engine
/// carries documented defaults for all three.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Canonical category list, in model-column order. Empty = default.
    #[serde(default)]
    pub canonical: Vec<String>,

    /// Seed percentage overrides: canonical parent → pct of income (0..=1).
    /// Replaces the default table entirely when non-empty.
    #[serde(default)]
    pub seed_policy: HashMap<String, f64>,

    /// Extra keyword rules, highest priority first; prepended to the
    /// built-in table.
    #[serde(default)]
    pub keywords: Vec<KeywordRuleConfig>,
}

/// One configured (pattern, parent) resolution rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRuleConfig {
    pub pattern: String,
    pub parent: String,
}

impl AppConfig {
    /// Load configuration from the default path (~/.smartspend/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `SMARTSPEND_PREDICTOR` — predictor kind
    /// - `SMARTSPEND_PREDICTOR_URL` — model service URL (implies "http")
    /// - `SMARTSPEND_PORT` — gateway port
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(kind) = std::env::var("SMARTSPEND_PREDICTOR") {
            config.predictor.kind = kind;
        }
        if let Ok(url) = std::env::var("SMARTSPEND_PREDICTOR_URL") {
            config.predictor.url = Some(url);
            config.predictor.kind = "http".into();
        }
        if let Ok(port) = std::env::var("SMARTSPEND_PORT") {
            if let Ok(port) = port.parse() {
                config.gateway.port = port;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".smartspend")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.predictor.kind.as_str() {
            "baseline" => {}
            "http" => {
                if self.predictor.url.is_none() {
                    return Err(ConfigError::ValidationError(
                        "predictor.url is required when predictor.kind = \"http\"".into(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown predictor.kind \"{other}\" (expected \"baseline\" or \"http\")"
                )));
            }
        }

        for (parent, pct) in &self.engine.seed_policy {
            if !(0.0..=1.0).contains(pct) {
                return Err(ConfigError::ValidationError(format!(
                    "seed_policy.{parent} must be between 0 and 1 (got {pct})"
                )));
            }
        }

        if !self.engine.canonical.is_empty() {
            for required in ["Savings", "Other", "Emergency"] {
                if !self.engine.canonical.iter().any(|c| c == required) {
                    return Err(ConfigError::ValidationError(format!(
                        "engine.canonical must include \"{required}\""
                    )));
                }
            }
        }

        for rule in &self.engine.keywords {
            if rule.pattern.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "engine.keywords patterns must be non-empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            predictor: PredictorConfig::default(),
            gateway: GatewayConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
