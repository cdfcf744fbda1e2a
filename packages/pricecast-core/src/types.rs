//! Core data types for the pricecast system.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One trading day of OHLCV data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    /// Trading date
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Shares traded
    pub volume: u64,
}

impl PriceBar {
    /// Create a bar, rejecting non-positive or non-finite prices.
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self> {
        let bar = Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        };
        bar.validate()?;
        Ok(bar)
    }

    /// Check every price field is a positive finite number.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidPrice(format!(
                    "{} on {} is {}",
                    field, self.date, value
                )));
            }
        }
        Ok(())
    }
}

/// An immutable daily price history for one ticker.
///
/// Dates are unique and strictly increasing; every price is positive.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from bars in chronological order.
    ///
    /// The symbol is normalized to uppercase. An empty bar list is allowed
    /// here; consumers that need history report `InsufficientData` themselves.
    pub fn new(symbol: &str, bars: Vec<PriceBar>) -> Result<Self> {
        for bar in &bars {
            bar.validate()?;
        }

        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(Error::InvalidSeries(format!(
                "dates must be strictly increasing: {} is followed by {}",
                pair[0].date, pair[1].date
            )));
        }

        Ok(Self {
            symbol: symbol.to_uppercase(),
            bars,
        })
    }

    /// Ticker symbol (uppercase)
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Trading dates in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Most recent close, or NaN for an empty series.
    pub fn last_close(&self) -> f64 {
        self.bars.last().map(|b| b.close).unwrap_or(f64::NAN)
    }

    /// Most recent trading date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Bars with `start <= date <= end` as a new series.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: self
                .bars
                .iter()
                .filter(|b| b.date >= start && b.date <= end)
                .copied()
                .collect(),
        }
    }
}

/// API response wrapper used by the CLI and other JSON consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(offset)
    }

    /// Series with one bar per calendar day and OHLC all equal to the close.
    pub(crate) fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::new(day(i as u64), c, c, c, c, 1_000).unwrap())
            .collect();
        PriceSeries::new("test", bars).unwrap()
    }

    #[test]
    fn test_bar_rejects_non_positive_price() {
        let result = PriceBar::new(day(0), 10.0, 11.0, 9.0, 0.0, 100);
        assert!(matches!(result, Err(Error::InvalidPrice(_))));

        let result = PriceBar::new(day(0), -1.0, 11.0, 9.0, 10.0, 100);
        assert!(matches!(result, Err(Error::InvalidPrice(_))));

        let result = PriceBar::new(day(0), 10.0, f64::NAN, 9.0, 10.0, 100);
        assert!(matches!(result, Err(Error::InvalidPrice(_))));
    }

    #[test]
    fn test_series_uppercases_symbol() {
        let series = series_from_closes(&[1.0, 2.0]);
        assert_eq!(series.symbol(), "TEST");
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_series_rejects_unordered_dates() {
        let a = PriceBar::new(day(1), 1.0, 1.0, 1.0, 1.0, 0).unwrap();
        let b = PriceBar::new(day(0), 1.0, 1.0, 1.0, 1.0, 0).unwrap();
        let result = PriceSeries::new("X", vec![a, b]);
        assert!(matches!(result, Err(Error::InvalidSeries(_))));

        // Duplicate dates are rejected too
        let result = PriceSeries::new("X", vec![a, a]);
        assert!(matches!(result, Err(Error::InvalidSeries(_))));
    }

    #[test]
    fn test_series_rejects_invalid_bar_fields() {
        // Struct literal bypasses PriceBar::new, series construction still checks
        let bad = PriceBar {
            date: day(0),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: -5.0,
            volume: 0,
        };
        let result = PriceSeries::new("X", vec![bad]);
        assert!(matches!(result, Err(Error::InvalidPrice(_))));
    }

    #[test]
    fn test_series_views() {
        let series = series_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0]);

        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0, 13.0, 14.0]);
        assert_eq!(series.last_close(), 14.0);
        assert_eq!(series.last_date(), Some(day(4)));

        let window = series.between(day(1), day(3));
        assert_eq!(window.closes(), vec![11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_empty_series_last_close_is_nan() {
        let series = PriceSeries::new("X", vec![]).unwrap();
        assert!(series.is_empty());
        assert!(series.last_close().is_nan());
        assert!(series.last_date().is_none());
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
    }
}
