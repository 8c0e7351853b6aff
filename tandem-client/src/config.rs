//! Configuration loading for Tandem.
//!
//! Configuration is loaded from a TOML file (default: `tandem.toml`).
//! Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tandem_types::COMMAND_PATH;

use crate::channel::LinkConfig;
use crate::controller::ControllerOptions;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "tandem.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Channel configuration.
    #[serde(default)]
    pub channel: ChannelConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Channel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Path commands travel on (default: `/cmd`).
    #[serde(default = "default_path")]
    pub path: String,
    /// Probability that the simulated link loses a message (default: 0.0).
    #[serde(default)]
    pub loss_rate: f64,
    /// Upper bound of the simulated per-message delay in ms (default: 0).
    #[serde(default)]
    pub max_delay_ms: u64,
    /// Seed for the simulated link (random if absent).
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive (default: `info`).
    #[serde(default = "default_filter")]
    pub filter: String,
}

// Default value functions
fn default_path() -> String {
    COMMAND_PATH.to_string()
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            loss_rate: 0.0,
            max_delay_ms: 0,
            seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Check value ranges serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.channel.loss_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Invalid(format!(
                "channel.loss_rate must be within [0, 1], got {}",
                rate
            )));
        }
        if !self.channel.path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "channel.path must start with '/', got {:?}",
                self.channel.path
            )));
        }
        Ok(())
    }

    /// Link behaviour for the in-memory channel.
    pub fn link_config(&self) -> LinkConfig {
        let mut link = LinkConfig::lossless()
            .with_loss(self.channel.loss_rate)
            .with_max_delay(Duration::from_millis(self.channel.max_delay_ms));
        if let Some(seed) = self.channel.seed {
            link = link.with_seed(seed);
        }
        link
    }

    /// Controller options derived from this configuration.
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions::default().with_path(&self.channel.path)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
