//! Simple Moving Average (SMA) and Exponential Moving Average (EMA) indicators.

use crate::{Error, Result};

/// Rolling mean over `period` values, NaN until the window is full.
///
/// Also provides the seed for [`ema`].
///
/// ```rust
/// use pricecast_core::indicators::sma;
///
/// let closes = vec![10.0, 11.0, 12.0, 11.0];
/// let values = sma(&closes, 3).unwrap();
///
/// assert!(values[1].is_nan());
/// assert_eq!(values[2], 11.0);
/// ```
pub fn sma(data: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period(period)?;

    let n = data.len();
    if n < period {
        return Err(Error::InsufficientData(format!(
            "SMA({}) needs at least {} values, got {}",
            period, period, n
        )));
    }

    let window = period as f64;
    let mut result = vec![f64::NAN; n];
    let mut running = 0.0;

    for (i, &x) in data.iter().enumerate() {
        running += x;
        if i >= period {
            running -= data[i - period];
        }
        if i + 1 >= period {
            result[i] = running / window;
        }
    }

    Ok(result)
}

/// Calculate Exponential Moving Average.
///
/// The first output is seeded with the simple average of the first `period`
/// defined inputs; after that `EMA[t] = x[t] * k + EMA[t-1] * (1 - k)` with
/// `k = 2 / (period + 1)`.
///
/// Leading NaN inputs are skipped, so an EMA can be taken of another
/// indicator's output (the MACD signal line does this). For a plain price
/// series the seed lands at index `period - 1`.
///
/// # Arguments
///
/// * `data` - Input series, optionally with a NaN warm-up prefix
/// * `period` - Lookback period (used to calculate smoothing factor)
///
/// # Returns
///
/// Vector of EMA values, NaN before the seed index.
///
/// # Example
///
/// ```rust
/// use pricecast_core::indicators::ema;
///
/// let closes = vec![100.0, 102.0, 101.0, 105.0, 103.0, 108.0, 107.0, 110.0];
/// let ema_values = ema(&closes, 3).unwrap();
///
/// assert!(ema_values[1].is_nan());
/// assert_eq!(ema_values[2], 101.0);
/// assert_eq!(ema_values[3], 103.0);
/// ```
pub fn ema(data: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period(period)?;

    let n = data.len();
    let first = data.iter().position(|x| !x.is_nan()).unwrap_or(n);
    if n - first < period {
        return Err(Error::InsufficientData(format!(
            "EMA({}) needs at least {} defined values, got {}",
            period,
            period,
            n - first
        )));
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed_idx = first + period - 1;

    let mut result = vec![f64::NAN; n];
    result[seed_idx] = sma(&data[first..=seed_idx], period)?[period - 1];

    for i in (seed_idx + 1)..n {
        result[i] = data[i] * k + result[i - 1] * (1.0 - k);
    }

    Ok(result)
}

fn check_period(period: usize) -> Result<()> {
    if period == 0 {
        return Err(Error::InvalidParameter(
            "indicator period must be at least 1".to_string(),
        ));
    }
    Ok(())
}
