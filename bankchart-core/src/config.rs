//! Run configuration, loadable from TOML.
//!
//! Every field has a default, so an empty file (or no file) reproduces the
//! standard chart: baseline 1 Jul 2024, refreshed after 8 PM Singapore time.
//!
//! ```toml
//! baseline = "2024-07-01"
//! output = "top_10_malaysian_banks.html"
//!
//! [schedule]
//! utc_offset_hours = 8
//! run_after_hour = 20
//!
//! [provider]
//! max_retries = 3
//! base_delay_ms = 500
//! timeout_secs = 30
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Date every series is rescaled against.
    pub baseline: NaiveDate,
    /// HTML file to write.
    pub output: PathBuf,
    /// Page title override.
    pub title: Option<String>,
    pub schedule: ScheduleSettings,
    pub provider: ProviderSettings,
}

/// When a refresh is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Offset of the exchange's local time from UTC.
    pub utc_offset_hours: i32,
    /// Earliest local hour (0-23) on a weekday at which to refresh.
    pub run_after_hour: u32,
}

/// Network behaviour of the Yahoo Finance provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            baseline: default_baseline(),
            output: PathBuf::from("top_10_malaysian_banks.html"),
            title: None,
            schedule: ScheduleSettings::default(),
            provider: ProviderSettings::default(),
        }
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            utc_offset_hours: 8,
            run_after_hour: 20,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            timeout_secs: 30,
        }
    }
}

fn default_baseline() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1).unwrap_or_default()
}

impl ChartConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-12..=14).contains(&self.schedule.utc_offset_hours) {
            return Err(ConfigError::Invalid(format!(
                "schedule.utc_offset_hours must be within -12..=14, got {}",
                self.schedule.utc_offset_hours
            )));
        }
        if self.schedule.run_after_hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "schedule.run_after_hour must be 0-23, got {}",
                self.schedule.run_after_hour
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Page title, e.g. "Top 10 Malaysian Banks Performance with base 1 Jul 2024".
    pub fn page_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| {
            format!(
                "Top 10 Malaysian Banks Performance with base {}",
                self.baseline.format("%-d %b %Y")
            )
        })
    }
}
