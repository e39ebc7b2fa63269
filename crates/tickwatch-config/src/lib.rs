//! Configuration management.

mod settings;

pub use settings::{AppConfig, AppSettings, LoggingConfig, MonitorSettings, ProviderSettings};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use thiserror::Error;
use tickwatch_core::error::TickwatchError;

/// Environment variable prefix, e.g. `TICKWATCH__MONITOR__POLL_INTERVAL_SECS`.
pub const ENV_PREFIX: &str = "TICKWATCH";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Component(#[from] TickwatchError),

    #[error("Failed to write configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, SettingsError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(env_source())
        .build()?;

    Ok(config.try_deserialize()?)
}

/// Like [`load_config`], but a missing file means built-in defaults.
pub fn load_config_or_default(path: &Path) -> Result<AppConfig, SettingsError> {
    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(env_source())
        .build()?;

    Ok(config.try_deserialize()?)
}
