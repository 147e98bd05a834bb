//! Configuration loading traits and types.
//!
//! Every dyno application loads a TOML file with a `[shared]` section and
//! an optional `[simulator]` section.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dyno_common::config::{ConfigError, SimulatorConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = SimulatorConfig::load_validated(Path::new("dyno.toml"))?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::consts::{CYCLE_T, DEFAULT_SERVICE_NAME, MAX_DT_S, PHYSICS_TICK_MS, UI_TICK_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Common configuration fields shared across all dyno applications.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "dyno-sim-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_physics_tick_ms() -> u64 {
    PHYSICS_TICK_MS
}

fn default_ui_tick_ms() -> u64 {
    UI_TICK_MS
}

fn default_max_dt_s() -> f64 {
    MAX_DT_S
}

/// Rates of the two-rate loop.
///
/// # TOML Example
///
/// ```toml
/// [simulator]
/// physics_tick_ms = 10
/// ui_tick_ms = 50
/// max_dt_s = 0.2
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    /// Physics step period.
    #[serde(default = "default_physics_tick_ms")]
    pub physics_tick_ms: u64,

    /// Publish period. Must not be shorter than the physics period.
    #[serde(default = "default_ui_tick_ms")]
    pub ui_tick_ms: u64,

    /// Measured dt above this is replaced by the nominal physics period.
    #[serde(default = "default_max_dt_s")]
    pub max_dt_s: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            physics_tick_ms: PHYSICS_TICK_MS,
            ui_tick_ms: UI_TICK_MS,
            max_dt_s: MAX_DT_S,
        }
    }
}

impl TimingConfig {
    /// Physics period as Duration.
    pub fn physics_tick(&self) -> Duration {
        Duration::from_millis(self.physics_tick_ms)
    }

    /// Physics period in seconds (the nominal dt).
    pub fn physics_tick_s(&self) -> f64 {
        self.physics_tick_ms as f64 / 1000.0
    }

    /// Publish period in seconds.
    pub fn ui_tick_s(&self) -> f64 {
        self.ui_tick_ms as f64 / 1000.0
    }

    /// Validate the rates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `physics_tick_ms` is zero
    /// - `ui_tick_ms` is shorter than `physics_tick_ms`
    /// - the physics period is longer than one drive cycle
    /// - `max_dt_s` is not a positive finite number or exceeds one drive cycle
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics_tick_ms == 0 {
            return Err(ConfigError::ValidationError(
                "physics_tick_ms must be greater than 0".to_string(),
            ));
        }
        if self.ui_tick_ms < self.physics_tick_ms {
            return Err(ConfigError::ValidationError(format!(
                "ui_tick_ms ({}) must be >= physics_tick_ms ({})",
                self.ui_tick_ms, self.physics_tick_ms
            )));
        }
        if self.physics_tick_s() > CYCLE_T {
            return Err(ConfigError::ValidationError(format!(
                "physics_tick_ms ({}) must not exceed the {CYCLE_T} s cycle",
                self.physics_tick_ms
            )));
        }
        if !self.max_dt_s.is_finite() || self.max_dt_s <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "max_dt_s must be a positive number, got {}",
                self.max_dt_s
            )));
        }
        if self.max_dt_s > CYCLE_T {
            return Err(ConfigError::ValidationError(format!(
                "max_dt_s ({}) must not exceed the {CYCLE_T} s cycle",
                self.max_dt_s
            )));
        }
        Ok(())
    }
}

/// Top-level simulator configuration (`dyno.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Shared application settings.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Loop rates.
    #[serde(default)]
    pub simulator: TimingConfig,
}

impl SimulatorConfig {
    /// Validate all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.simulator.validate()
    }

    /// Load from `path` and validate.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        debug!(
            "Loaded simulator config from {:?}: physics={}ms ui={}ms",
            path, config.simulator.physics_tick_ms, config.simulator.ui_tick_ms
        );
        Ok(config)
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
