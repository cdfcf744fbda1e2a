//! End-to-end forecast for one price series and target date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ForecastConfig;
use crate::horizon::horizon_for;
use crate::indicators::IndicatorSeries;
use crate::returns::ReturnStatistics;
use crate::simulation::{PathSimulator, SimulationEnsemble, TerminalDistribution};
use crate::types::PriceSeries;
use crate::{Error, Result};

/// What to forecast: a target date relative to a reference day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForecastRequest {
    /// Day the horizon is counted from (usually the current date)
    pub today: NaiveDate,
    /// Date the forecast distribution refers to
    pub target_date: NaiveDate,
}

impl ForecastRequest {
    pub fn new(today: NaiveDate, target_date: NaiveDate) -> Self {
        Self { today, target_date }
    }
}

/// Everything a presentation layer needs for one forecast.
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub symbol: String,
    pub request: ForecastRequest,
    /// Simulated steps in business days
    pub horizon: usize,
    /// Last close in the history, where every path starts
    pub start_price: f64,
    pub statistics: ReturnStatistics,
    pub indicators: IndicatorSeries,
    pub ensemble: SimulationEnsemble,
    /// Date of each simulated step, step 0 being the last historical date
    pub step_dates: Vec<NaiveDate>,
    pub distribution: TerminalDistribution,
}

/// Run statistics, indicators and the Monte Carlo simulation for `series`.
///
/// All parameters are validated before any simulation work starts, and the
/// result is all-or-nothing.
pub fn forecast(
    series: &PriceSeries,
    request: &ForecastRequest,
    config: &ForecastConfig,
) -> Result<Forecast> {
    config.validate()?;

    let horizon = horizon_for(request.today, request.target_date, config.max_horizon_days)?;
    let last_date = series.last_date().ok_or_else(|| {
        Error::InsufficientData(format!("price series for {} is empty", series.symbol()))
    })?;

    let statistics = ReturnStatistics::from_series(series)?;
    let indicators = IndicatorSeries::compute(series, &config.indicators)?;

    let start_price = series.last_close();
    let ensemble = PathSimulator::new(statistics, config.simulation.clone())
        .simulate(start_price, horizon as i64)?;
    let distribution = ensemble.terminal_distribution(
        config.simulation.lower_percentile,
        config.simulation.upper_percentile,
    )?;
    let step_dates = ensemble.step_dates(last_date);

    info!(
        symbol = series.symbol(),
        horizon,
        lower = distribution.lower_bound,
        median = distribution.median,
        upper = distribution.upper_bound,
        "forecast complete"
    );

    Ok(Forecast {
        symbol: series.symbol().to_string(),
        request: *request,
        horizon,
        start_price,
        statistics,
        indicators,
        ensemble,
        step_dates,
        distribution,
    })
}
