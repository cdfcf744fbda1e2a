//! Technical indicators for trading analysis.
//!
//! This module provides the indicators shown alongside a forecast:
//!
//! - **SMA**: Simple Moving Average (seeds the EMA)
//! - **EMA**: Exponential Moving Average
//! - **RSI**: Relative Strength Index
//! - **MACD**: Moving Average Convergence Divergence
//!
//! Every indicator returns a vector the same length as its input. Positions
//! inside the warm-up window hold NaN rather than zero so that they can never
//! be mistaken for a real reading.

mod ema;
mod rsi;

pub use ema::{ema, sma};
pub use rsi::{rsi, rsi_zones, RsiZone};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::IndicatorConfig;
use crate::types::PriceSeries;
use crate::{Error, Result};

/// MACD (Moving Average Convergence Divergence) result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Macd {
    /// MACD line (fast EMA - slow EMA)
    pub macd_line: Vec<f64>,
    /// Signal line (EMA of MACD line)
    pub signal_line: Vec<f64>,
    /// Histogram (MACD - Signal)
    pub histogram: Vec<f64>,
}

/// Calculate MACD indicator.
///
/// # Arguments
///
/// * `data` - Price series
/// * `fast_period` - Fast EMA period (typically 12)
/// * `slow_period` - Slow EMA period (typically 26)
/// * `signal_period` - Signal line EMA period (typically 9)
///
/// # Returns
///
/// MACD with macd_line, signal_line, and histogram. The line is defined from
/// index `slow_period - 1`, the signal and histogram from
/// `slow_period + signal_period - 2`.
pub fn macd(
    data: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Result<Macd> {
    if fast_period == 0 || signal_period == 0 || fast_period >= slow_period {
        return Err(Error::InvalidParameter(format!(
            "MACD periods must satisfy 0 < fast < slow and signal > 0, got ({}, {}, {})",
            fast_period, slow_period, signal_period
        )));
    }

    let warm_up = slow_period + signal_period - 1;
    if data.len() < warm_up {
        return Err(Error::InsufficientData(format!(
            "MACD({}, {}, {}) needs at least {} prices, got {}",
            fast_period,
            slow_period,
            signal_period,
            warm_up,
            data.len()
        )));
    }

    let fast_ema = ema(data, fast_period)?;
    let slow_ema = ema(data, slow_period)?;

    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(fast, slow)| fast - slow)
        .collect();

    let signal_line = ema(&macd_line, signal_period)?;

    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(line, signal)| line - signal)
        .collect();

    Ok(Macd {
        macd_line,
        signal_line,
        histogram,
    })
}

/// EMA, RSI and MACD aligned to the dates of one price series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSeries {
    /// Trading dates shared by every indicator vector
    pub dates: Vec<NaiveDate>,
    pub ema: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: Macd,
    /// RSI momentum zone per date, `None` during warm-up
    pub rsi_zones: Vec<Option<RsiZone>>,
}

impl IndicatorSeries {
    /// Compute every indicator over the full close history.
    ///
    /// Fails if the series is shorter than any indicator's warm-up window;
    /// no partial set of indicators is ever returned.
    pub fn compute(series: &PriceSeries, config: &IndicatorConfig) -> Result<Self> {
        let closes = series.closes();

        let ema = ema(&closes, config.ema_period)?;
        let rsi = rsi(&closes, config.rsi_period)?;
        let macd = macd(
            &closes,
            config.macd_fast,
            config.macd_slow,
            config.macd_signal,
        )?;
        let rsi_zones = rsi_zones(&rsi, config.rsi_oversold, config.rsi_overbought);

        debug!(
            symbol = series.symbol(),
            len = closes.len(),
            "computed indicator series"
        );

        Ok(Self {
            dates: series.dates(),
            ema,
            rsi,
            macd,
            rsi_zones,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The trailing `n` entries of every indicator (the original chart shows
    /// the last 252 trading days).
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            dates: self.dates[start..].to_vec(),
            ema: self.ema[start..].to_vec(),
            rsi: self.rsi[start..].to_vec(),
            macd: Macd {
                macd_line: self.macd.macd_line[start..].to_vec(),
                signal_line: self.macd.signal_line[start..].to_vec(),
                histogram: self.macd.histogram[start..].to_vec(),
            },
            rsi_zones: self.rsi_zones[start..].to_vec(),
        }
    }
}
