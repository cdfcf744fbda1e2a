//! Relative Strength Index (RSI) indicator.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Calculate RSI value from average gain and average loss.
/// No losses in the window means RSI = 100, whatever the gains.
#[inline]
fn calculate_rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

/// Calculate Relative Strength Index.
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions.
///
/// Formula:
/// 1. Calculate price changes
/// 2. Separate gains and losses
/// 3. Average gain and average loss over the first `period` changes
/// 4. Smooth later averages with Wilder's method (weight `1/period`)
/// 5. RSI = 100 - (100 / (1 + average_gain / average_loss))
///
/// # Arguments
///
/// * `prices` - Price series (typically closing prices)
/// * `period` - Lookback period (typically 14)
///
/// # Returns
///
/// Vector of RSI values (0-100 scale), same length as `prices`. Indices
/// before `period` are NaN. Values below 30 typically indicate oversold
/// conditions, above 70 overbought.
///
/// # Example
///
/// ```rust
/// use pricecast_core::indicators::rsi;
///
/// let prices = vec![44.0, 44.25, 44.5, 43.75, 44.5, 44.25, 44.5, 44.0, 43.5, 44.0,
///                   44.25, 44.0, 43.5, 44.0, 44.5, 44.25, 44.0];
/// let rsi_values = rsi(&prices, 14).unwrap();
///
/// assert!(rsi_values[13].is_nan());
/// for &value in &rsi_values[14..] {
///     assert!(value >= 0.0 && value <= 100.0);
/// }
/// ```
pub fn rsi(prices: &[f64], period: usize) -> Result<Vec<f64>> {
    if period == 0 {
        return Err(Error::InvalidParameter(
            "RSI period must be at least 1".to_string(),
        ));
    }

    let n = prices.len();
    // Need at least period+1 prices to calculate
    if n <= period {
        return Err(Error::InsufficientData(format!(
            "RSI({}) needs at least {} prices, got {}",
            period,
            period + 1,
            n
        )));
    }

    // Calculate price changes
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];

    for i in 1..n {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change; // Store as positive value
        }
    }

    let mut result = vec![f64::NAN; n];

    // Calculate initial average gain and loss (SMA for first period)
    let mut avg_gain: f64 = gains[1..=period].iter().sum::<f64>() / period as f64;
    let mut avg_loss: f64 = losses[1..=period].iter().sum::<f64>() / period as f64;

    result[period] = calculate_rsi_value(avg_gain, avg_loss);

    let alpha = 1.0 / period as f64;

    for i in (period + 1)..n {
        // Wilder's smoothing: avg = (prev_avg * (period - 1) + current) / period
        avg_gain = alpha * gains[i] + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * losses[i] + (1.0 - alpha) * avg_loss;

        result[i] = calculate_rsi_value(avg_gain, avg_loss);
    }

    Ok(result)
}

/// Momentum zone of a single RSI reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RsiZone {
    Oversold,
    Neutral,
    Overbought,
}

/// Classify RSI readings against oversold/overbought thresholds.
///
/// # Arguments
///
/// * `rsi_values` - Calculated RSI values
/// * `oversold` - Oversold threshold (typically 30)
/// * `overbought` - Overbought threshold (typically 70)
///
/// # Returns
///
/// One entry per reading; `None` where the RSI is undefined. Readings exactly
/// on a threshold are neutral.
pub fn rsi_zones(rsi_values: &[f64], oversold: f64, overbought: f64) -> Vec<Option<RsiZone>> {
    rsi_values
        .iter()
        .map(|&rsi| {
            if rsi.is_nan() {
                None
            } else if rsi < oversold {
                Some(RsiZone::Oversold)
            } else if rsi > overbought {
                Some(RsiZone::Overbought)
            } else {
                Some(RsiZone::Neutral)
            }
        })
        .collect()
}
