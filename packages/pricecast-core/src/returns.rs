//! Log-return statistics over a historical price series.
//!
//! The mean and standard deviation computed here drive the Monte Carlo
//! simulator as its per-step drift and volatility.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::PriceSeries;
use crate::{Error, Result};

/// Summary of daily log-returns over an entire price history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReturnStatistics {
    /// Mean daily log-return (drift)
    pub mean: f64,
    /// Sample standard deviation of daily log-returns (volatility)
    pub std_dev: f64,
    /// Number of returns the statistics were computed from
    pub observations: usize,
}

impl ReturnStatistics {
    /// Build statistics from explicit parameters.
    ///
    /// Useful when drift and volatility come from somewhere other than a
    /// price history. Rejects non-finite values and negative volatility.
    pub fn new(mean: f64, std_dev: f64) -> Result<Self> {
        if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "return statistics must be finite with non-negative std_dev, got mean={} std_dev={}",
                mean, std_dev
            )));
        }

        Ok(Self {
            mean,
            std_dev,
            observations: 0,
        })
    }

    /// Compute statistics over every close in the series.
    pub fn from_series(series: &PriceSeries) -> Result<Self> {
        Self::from_closes(&series.closes())
    }

    /// Compute statistics from a slice of closing prices.
    ///
    /// Uses the sample standard deviation (n - 1 denominator). With a single
    /// return there is no dispersion to measure and `std_dev` is 0.0.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pricecast_core::ReturnStatistics;
    ///
    /// let stats = ReturnStatistics::from_closes(&[100.0, 110.0, 121.0]).unwrap();
    /// assert!((stats.mean - 1.1_f64.ln()).abs() < 1e-12);
    /// assert!(stats.std_dev.abs() < 1e-12);
    /// ```
    pub fn from_closes(closes: &[f64]) -> Result<Self> {
        let returns = log_returns(closes)?;
        let n = returns.len() as f64;

        let mean = returns.iter().sum::<f64>() / n;
        let std_dev = if returns.len() > 1 {
            let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        } else {
            0.0
        };

        debug!(
            observations = returns.len(),
            mean, std_dev, "computed log-return statistics"
        );

        Ok(Self {
            mean,
            std_dev,
            observations: returns.len(),
        })
    }

    /// Annualized volatility assuming 252 trading days.
    pub fn annualized_volatility(&self) -> f64 {
        self.std_dev * (252.0_f64).sqrt()
    }

    /// Annualized drift assuming 252 trading days.
    pub fn annualized_drift(&self) -> f64 {
        self.mean * 252.0
    }
}

/// Log-returns `ln(close[t] / close[t-1])` for t = 1..n.
///
/// Fails with `InsufficientData` for fewer than two closes and with
/// `InvalidPrice` if any close is zero, negative or non-finite.
pub fn log_returns(closes: &[f64]) -> Result<Vec<f64>> {
    if closes.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "need at least 2 closing prices for log-returns, got {}",
            closes.len()
        )));
    }

    if let Some((idx, &bad)) = closes
        .iter()
        .enumerate()
        .find(|&(_, &c)| !c.is_finite() || c <= 0.0)
    {
        return Err(Error::InvalidPrice(format!(
            "close at index {} is {}",
            idx, bad
        )));
    }

    Ok(closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}
