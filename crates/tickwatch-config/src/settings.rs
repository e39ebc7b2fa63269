//! Configuration structures.

use serde::{Deserialize, Serialize};
use tickwatch_core::error::TickwatchError;
use tickwatch_core::types::Timeframe;
use tickwatch_data::YahooConfig;
use tickwatch_indicators::EngineConfig;
use tickwatch_signals::ClassifierConfig;

use crate::SettingsError;

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub indicators: EngineConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub monitor: MonitorSettings,
}

impl AppConfig {
    /// Check every section; the first problem found is returned.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.indicators.validate().map_err(TickwatchError::from)?;
        self.classifier.validate().map_err(TickwatchError::from)?;

        if self.provider.history_days == 0 {
            return Err(SettingsError::Invalid("provider.history_days must be > 0".into()));
        }
        let yahoo = &self.provider.yahoo;
        if yahoo.max_retries > 10 {
            return Err(SettingsError::Invalid(format!(
                "provider.yahoo.max_retries must be at most 10, got {}",
                yahoo.max_retries
            )));
        }
        if !(1..=300).contains(&yahoo.timeout_secs) {
            return Err(SettingsError::Invalid(format!(
                "provider.yahoo.timeout_secs must be between 1 and 300, got {}",
                yahoo.timeout_secs
            )));
        }
        if yahoo.retry_base_ms > 60_000 {
            return Err(SettingsError::Invalid(format!(
                "provider.yahoo.retry_base_ms must be at most 60000, got {}",
                yahoo.retry_base_ms
            )));
        }
        if yahoo.latest_range_days == 0 {
            return Err(SettingsError::Invalid(
                "provider.yahoo.latest_range_days must be > 0".into(),
            ));
        }
        if self.monitor.poll_interval_secs == 0 {
            return Err(SettingsError::Invalid(
                "monitor.poll_interval_secs must be > 0".into(),
            ));
        }
        if self.monitor.display_days == 0 {
            return Err(SettingsError::Invalid("monitor.display_days must be > 0".into()));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(SettingsError::Invalid(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// The configuration as TOML.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// General app settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    /// Ticker used when none is given on the command line
    pub default_symbol: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "tickwatch".to_string(),
            default_symbol: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Market data settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Days of history loaded before monitoring starts
    pub history_days: u32,
    pub timeframe: Timeframe,
    pub yahoo: YahooConfig,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            history_days: 730,
            timeframe: Timeframe::Daily,
            yahoo: YahooConfig::default(),
        }
    }
}

/// Live monitoring and chart settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub poll_interval_secs: u64,
    /// Days shown on the chart, counted back from the latest bar
    pub display_days: u32,
    pub show_chart: bool,
    /// Chart redraw/input poll period
    pub chart_refresh_ms: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            display_days: 365,
            show_chart: true,
            chart_refresh_ms: 250,
        }
    }
}
