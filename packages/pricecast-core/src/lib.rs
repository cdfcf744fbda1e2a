//! Pricecast Core - Price forecasting and technical analysis library.
//!
//! This crate turns a historical daily price series into two independent
//! products:
//!
//! - **Return statistics**: mean and standard deviation of log-returns
//! - **Monte Carlo forecast**: Geometric Brownian Motion price paths and the
//!   distribution of their terminal prices
//! - **Technical indicators**: EMA, RSI, MACD aligned to the input dates
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pricecast_core::{PathSimulator, PriceBar, PriceSeries, ReturnStatistics, SimulationConfig};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let bars: Vec<PriceBar> = [100.0, 101.0, 99.5, 102.0, 103.5]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &close)| {
//!         PriceBar::new(start + chrono::Days::new(i as u64), close, close, close, close, 1_000)
//!     })
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! let series = PriceSeries::new("AAPL", bars).unwrap();
//!
//! let stats = ReturnStatistics::from_series(&series).unwrap();
//! let config = SimulationConfig { simulations: 50, seed: Some(7), ..Default::default() };
//! let ensemble = PathSimulator::new(stats, config)
//!     .simulate(series.last_close(), 10)
//!     .unwrap();
//!
//! assert_eq!(ensemble.paths().len(), 50);
//! assert!(ensemble.paths().iter().all(|p| p.len() == 11));
//! ```

pub mod config;
pub mod forecast;
pub mod horizon;
pub mod indicators;
pub mod returns;
pub mod simulation;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use config::{ForecastConfig, IndicatorConfig};
pub use forecast::{forecast, Forecast, ForecastRequest};
pub use horizon::{business_dates_after, business_days_between, horizon_for};
pub use indicators::{ema, macd, rsi, rsi_zones, sma, IndicatorSeries, Macd, RsiZone};
pub use returns::{log_returns, ReturnStatistics};
pub use simulation::{
    percentile, Histogram, PathSimulator, SimulationConfig, SimulationEnsemble,
    TerminalDistribution,
};
pub use source::{history_window, JsonFileSource, PriceSource};
pub use types::{ApiResponse, PriceBar, PriceSeries};

/// Error types for pricecast-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
}

/// Result type for pricecast-core operations.
pub type Result<T> = std::result::Result<T, Error>;
