//! Forecast configuration loaded from TOML.
//!
//! Every field has a default, so a missing file or a partial file is valid.
//! The config path is `PRICECAST_CONFIG` if set, otherwise
//! `<platform config dir>/pricecast/config.toml`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Longest history a forecast may request from the price source.
pub const MAX_LOOKBACK_YEARS: u32 = 100;

/// Monte Carlo simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent paths per forecast
    pub simulations: usize,
    /// Seed for reproducible runs (None = OS entropy)
    pub seed: Option<u64>,
    /// Generate paths on the calling thread even when the `parallel`
    /// feature is enabled
    pub force_sequential: bool,
    /// Lower percentile reported for terminal prices
    pub lower_percentile: f64,
    /// Upper percentile reported for terminal prices
    pub upper_percentile: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulations: 500,
            seed: None,
            force_sequential: false,
            lower_percentile: 5.0,
            upper_percentile: 95.0,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.simulations == 0 {
            return Err(Error::InvalidParameter(
                "simulation count must be positive".to_string(),
            ));
        }

        let (lo, hi) = (self.lower_percentile, self.upper_percentile);
        if !(0.0..=100.0).contains(&lo) || !(0.0..=100.0).contains(&hi) || lo > hi {
            return Err(Error::InvalidParameter(format!(
                "percentile bounds must satisfy 0 <= lower <= upper <= 100, got {} and {}",
                lo, hi
            )));
        }

        Ok(())
    }
}

/// Technical indicator periods and RSI zone thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ema_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_period: 12,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ema_period == 0
            || self.rsi_period == 0
            || self.macd_fast == 0
            || self.macd_signal == 0
            || self.macd_fast >= self.macd_slow
        {
            return Err(Error::InvalidParameter(format!(
                "invalid indicator periods: ema={} rsi={} macd=({}, {}, {})",
                self.ema_period,
                self.rsi_period,
                self.macd_fast,
                self.macd_slow,
                self.macd_signal
            )));
        }

        if self.rsi_oversold > self.rsi_overbought {
            return Err(Error::InvalidParameter(format!(
                "RSI oversold threshold {} is above overbought threshold {}",
                self.rsi_oversold, self.rsi_overbought
            )));
        }

        Ok(())
    }
}

/// Top-level configuration for a forecast run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForecastConfig {
    pub simulation: SimulationConfig,
    pub indicators: IndicatorConfig,
    /// Furthest target date accepted, in calendar days from today
    pub max_horizon_days: i64,
    /// Years of history requested from the price source
    pub lookback_years: u32,
    /// Number of trailing trading days in the analysis window
    pub analysis_window: usize,
    /// Directory holding `<SYMBOL>.json` price files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            indicators: IndicatorConfig::default(),
            max_horizon_days: 90,
            lookback_years: 10,
            analysis_window: 252,
            data_dir: None,
        }
    }
}

impl ForecastConfig {
    /// Load from the default path, falling back to defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Can be overridden with the `PRICECAST_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("PRICECAST_CONFIG") {
            return PathBuf::from(path);
        }

        directories::ProjectDirs::from("", "", "pricecast")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("pricecast.toml"))
    }

    /// Directory the JSON price source reads from.
    pub fn resolved_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }

        directories::ProjectDirs::from("", "", "pricecast")
            .map(|dirs| dirs.data_dir().join("prices"))
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.indicators.validate()?;

        if self.max_horizon_days < 0 {
            return Err(Error::InvalidParameter(format!(
                "max_horizon_days must not be negative, got {}",
                self.max_horizon_days
            )));
        }

        if self.lookback_years == 0 || self.lookback_years > MAX_LOOKBACK_YEARS {
            return Err(Error::InvalidParameter(format!(
                "lookback_years must be between 1 and {}, got {}",
                MAX_LOOKBACK_YEARS, self.lookback_years
            )));
        }

        Ok(())
    }
}
