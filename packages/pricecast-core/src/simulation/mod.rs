//! Monte Carlo price-path simulation.
//!
//! - **PathSimulator**: generates an ensemble of GBM paths
//! - **SimulationEnsemble**: the generated paths, read-only
//! - **TerminalDistribution**: percentile summary of the final prices

mod distribution;
mod paths;

pub use distribution::{percentile, Histogram, TerminalDistribution};
pub use paths::PathSimulator;

pub use crate::config::SimulationConfig;

use chrono::NaiveDate;
use serde::Serialize;

use crate::horizon::business_dates_after;
use crate::Result;

/// A set of simulated price paths sharing a start price and horizon.
///
/// Every path holds `horizon + 1` prices, the first being the start price.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimulationEnsemble {
    start_price: f64,
    horizon: usize,
    paths: Vec<Vec<f64>>,
}

impl SimulationEnsemble {
    pub(crate) fn new(start_price: f64, horizon: usize, paths: Vec<Vec<f64>>) -> Self {
        Self {
            start_price,
            horizon,
            paths,
        }
    }

    pub fn start_price(&self) -> f64 {
        self.start_price
    }

    /// Number of simulated steps per path
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn paths(&self) -> &[Vec<f64>] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Final price of every path, in path order.
    pub fn terminal_prices(&self) -> Vec<f64> {
        self.paths
            .iter()
            .map(|p| p.last().copied().unwrap_or(f64::NAN))
            .collect()
    }

    /// Summarize terminal prices with the given percentile bounds.
    pub fn terminal_distribution(
        &self,
        lower_percentile: f64,
        upper_percentile: f64,
    ) -> Result<TerminalDistribution> {
        TerminalDistribution::from_prices(
            self.terminal_prices(),
            lower_percentile,
            upper_percentile,
        )
    }

    /// Calendar dates for each step, step 0 being `anchor`.
    ///
    /// Later steps fall on consecutive business days after the anchor.
    pub fn step_dates(&self, anchor: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(self.horizon + 1);
        dates.push(anchor);
        dates.extend(business_dates_after(anchor, self.horizon));
        dates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};

    #[test]
    fn test_terminal_prices() {
        let ensemble = SimulationEnsemble::new(
            10.0,
            2,
            vec![vec![10.0, 11.0, 12.0], vec![10.0, 9.0, 8.5]],
        );

        assert_eq!(ensemble.len(), 2);
        assert_eq!(ensemble.terminal_prices(), vec![12.0, 8.5]);
    }

    #[test]
    fn test_step_dates_skip_weekends() {
        let ensemble = SimulationEnsemble::new(1.0, 3, vec![vec![1.0; 4]]);
        // 2024-01-05 is a Friday
        let friday = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let dates = ensemble.step_dates(friday);

        assert_eq!(dates.len(), 4);
        assert_eq!(dates[0], friday);
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(dates[3], NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert!(dates[1..]
            .iter()
            .all(|d| d.weekday() != Weekday::Sat && d.weekday() != Weekday::Sun));
    }
}
