//! Price data sources.
//!
//! The forecasting core never talks to a market-data provider directly; it
//! takes a [`PriceSeries`] from anything implementing [`PriceSource`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::types::{PriceBar, PriceSeries};
use crate::{Error, Result};

/// Provider of historical daily price series.
pub trait PriceSource {
    /// Fetch bars for `symbol` with `start <= date <= end`.
    ///
    /// # Errors
    ///
    /// Returns `DataUnavailable` for an unknown symbol, unreadable data, or
    /// when no bars fall in the range; never an empty series.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;
}

/// Reads `<dir>/<SYMBOL>.json`, a JSON array of bars in date order.
///
/// ```json
/// [{"date": "2024-01-02", "open": 1.0, "high": 1.1, "low": 0.9, "close": 1.05, "volume": 1200}]
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", symbol))
    }
}

impl PriceSource for JsonFileSource {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let symbol = normalize_symbol(symbol)?;

        if end < start {
            return Err(Error::InvalidParameter(format!(
                "date range end {} is before start {}",
                end, start
            )));
        }

        let path = self.path_for(&symbol);
        if !path.exists() {
            return Err(Error::DataUnavailable(format!(
                "no price data for {} in {}",
                symbol,
                self.dir.display()
            )));
        }

        let content = fs::read_to_string(&path)?;
        let bars: Vec<PriceBar> = serde_json::from_str(&content).map_err(|e| {
            Error::DataUnavailable(format!("malformed price file {}: {}", path.display(), e))
        })?;
        let series = PriceSeries::new(&symbol, bars)?.between(start, end);

        if series.is_empty() {
            return Err(Error::DataUnavailable(format!(
                "no {} bars between {} and {}",
                symbol, start, end
            )));
        }

        debug!(symbol = %symbol, bars = series.len(), "loaded price file");
        Ok(series)
    }
}

/// Uppercase a ticker and reject anything that is not a plain symbol.
fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && !symbol.starts_with('.')
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));

    if !valid {
        return Err(Error::InvalidParameter(format!(
            "invalid ticker symbol: {:?}",
            symbol
        )));
    }
    Ok(symbol)
}

/// Date range covering `years` of history up to and including `today`.
///
/// # Errors
///
/// Returns `InvalidParameter` when the start would fall outside the
/// representable calendar.
pub fn history_window(today: NaiveDate, years: u32) -> Result<(NaiveDate, NaiveDate)> {
    let start = today
        .checked_sub_days(Days::new(365 * u64::from(years)))
        .ok_or_else(|| {
            Error::InvalidParameter(format!(
                "{} years of history before {} is out of range",
                years, today
            ))
        })?;
    Ok((start, today))
}
