use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::events::DEFAULT_FORECAST_HORIZON;

pub const ENV_PRICE_FILE: &str = "LUNAR_CHART_PRICES";
pub const ENV_LOOKBACK_DAYS: &str = "LUNAR_CHART_LOOKBACK_DAYS";
pub const ENV_REFRESH_SECS: &str = "LUNAR_CHART_REFRESH_SECS";
pub const ENV_HORIZON_DAYS: &str = "LUNAR_CHART_HORIZON_DAYS";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a whole number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

// Runtime settings for the lunar chart
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub price_file: PathBuf,
    pub lookback_days: u32,
    pub refresh_interval: Duration,
    pub forecast_horizon_days: u32,
    pub window_size: [f32; 2],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            price_file: PathBuf::from("data/prices.csv"),
            lookback_days: 365,
            refresh_interval: Duration::from_secs(60),
            forecast_horizon_days: DEFAULT_FORECAST_HORIZON,
            window_size: [1100.0, 720.0],
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from any key lookup; bad values are logged and skipped
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_PRICE_FILE).filter(|p| !p.trim().is_empty()) {
            config.price_file = PathBuf::from(path.trim());
        }

        if let Some(days) = positive_override(&lookup, ENV_LOOKBACK_DAYS) {
            config.lookback_days = days;
        }
        if let Some(secs) = positive_override(&lookup, ENV_REFRESH_SECS) {
            config.refresh_interval = Duration::from_secs(u64::from(secs));
        }
        if let Some(days) = positive_override(&lookup, ENV_HORIZON_DAYS) {
            config.forecast_horizon_days = days;
        }

        config
    }
}

fn positive_override<F>(lookup: &F, key: &'static str) -> Option<u32>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match parse_positive(key, &raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(target: "config", "Ignoring override: {}", e);
            None
        }
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    let value = u32::from_str(raw.trim()).map_err(|_| ConfigError::InvalidNumber {
        key,
        value: raw.to_string(),
    })?;
    if value == 0 {
        return Err(ConfigError::Zero { key });
    }
    Ok(value)
}
