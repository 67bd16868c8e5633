//! Configuration loading and typed config structures for Askboard.
//!
//! The canonical configuration lives in `askboard-config.yaml` in the
//! working directory. Every section and field has a default, so an empty
//! or missing file yields a working server.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::demo::DemoScript;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `askboard-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AskboardConfig {
    /// Listen address for the HTTP/WebSocket server.
    #[serde(default)]
    pub server: ListenConfig,

    /// Board and session behaviour.
    #[serde(default)]
    pub board: BoardConfig,

    /// Scripted demo traffic.
    #[serde(default)]
    pub demo: DemoConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AskboardConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listen address:
    /// - `ASKBOARD_HOST` overrides `server.host`
    /// - `ASKBOARD_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying environment
    /// overrides and validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `ASKBOARD_*` overrides using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `ASKBOARD_PORT` is not a port.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("ASKBOARD_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("ASKBOARD_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("ASKBOARD_PORT={port}: {e}")))?;
        }
        Ok(())
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.first_question_id == 0 {
            return Err(ConfigError::Invalid(
                "board.first_question_id must be at least 1".to_owned(),
            ));
        }
        if self.board.subscriber_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "board.subscriber_queue_capacity must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Listen address for the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListenConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Board and session behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardConfig {
    /// First id handed out by `add`. Seed data should stay below it.
    #[serde(default = "default_first_question_id")]
    pub first_question_id: u32,

    /// Delay between a `report` and the resulting removal, in milliseconds.
    #[serde(default = "default_report_grace_ms")]
    pub report_grace_ms: u64,

    /// Events a subscriber may have queued before it is detached.
    #[serde(default = "default_subscriber_queue_capacity")]
    pub subscriber_queue_capacity: usize,
}

impl BoardConfig {
    /// The report grace period as a [`Duration`].
    pub const fn report_grace(&self) -> Duration {
        Duration::from_millis(self.report_grace_ms)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            first_question_id: default_first_question_id(),
            report_grace_ms: default_report_grace_ms(),
            subscriber_queue_capacity: default_subscriber_queue_capacity(),
        }
    }
}

/// Scripted demo traffic played against the board at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DemoConfig {
    /// Whether to run the script.
    #[serde(default)]
    pub enabled: bool,

    /// Steps to play. Defaults to the built-in script.
    #[serde(default)]
    pub steps: DemoScript,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_first_question_id() -> u32 {
    1001
}

const fn default_report_grace_ms() -> u64 {
    1000
}

const fn default_subscriber_queue_capacity() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_owned()
}
