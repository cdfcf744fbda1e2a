//! Terminal-price distribution of a simulation ensemble.

use serde::Serialize;
use tracing::warn;

use crate::{Error, Result};

/// Percentile of `values` using linear interpolation between order statistics.
///
/// NaN values are ignored. The position of percentile `q` among the `n`
/// sorted values is `q/100 * (n - 1)`; fractional positions interpolate
/// between neighbours. The interpolation is evaluated from the nearer
/// neighbour (`a + (b-a)*t` below the midpoint, `b - (b-a)*(1-t)` from it)
/// so results match the common numeric-library implementation bit for bit.
///
/// Returns `None` when `values` holds no non-NaN entry or `q` is outside
/// `[0, 100]`.
///
/// # Example
///
/// ```rust
/// use pricecast_core::percentile;
///
/// let values = [4.0, 1.0, f64::NAN, 3.0, 2.0];
/// assert_eq!(percentile(&values, 50.0), Some(2.5));
/// assert_eq!(percentile(&values, 0.0), Some(1.0));
/// assert_eq!(percentile(&[f64::NAN], 50.0), None);
/// ```
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let sorted = sorted_without_nan(values);
    percentile_of_sorted(&sorted, q)
}

fn sorted_without_nan(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

fn percentile_of_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=100.0).contains(&q) {
        return None;
    }

    let position = (q / 100.0) * (sorted.len() - 1) as f64;
    let lower = position.floor();
    let t = position - lower;
    let lower = lower as usize;
    let upper = (lower + 1).min(sorted.len() - 1);

    let a = sorted[lower];
    let b = sorted[upper];
    let diff = b - a;

    Some(if t >= 0.5 { b - diff * (1.0 - t) } else { a + diff * t })
}

/// Equal-width histogram of terminal prices.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Histogram {
    /// Bin edges, one more than the number of bins
    pub edges: Vec<f64>,
    /// Count per bin; the last bin includes its right edge
    pub counts: Vec<usize>,
}

/// Final prices of an ensemble with percentile bounds.
#[derive(Debug, Clone, Serialize)]
pub struct TerminalDistribution {
    /// Final price of every path, in path order (NaN included)
    pub prices: Vec<f64>,
    /// Lower percentile requested (e.g. 5.0)
    pub lower_percentile: f64,
    /// Upper percentile requested (e.g. 95.0)
    pub upper_percentile: f64,
    /// Price at the lower percentile
    pub lower_bound: f64,
    /// Price at the upper percentile
    pub upper_bound: f64,
    pub median: f64,
    pub mean: f64,
    /// Number of NaN prices left out of the statistics
    pub excluded: usize,
    #[serde(skip)]
    sorted: Vec<f64>,
}

impl TerminalDistribution {
    /// Build the distribution from terminal prices.
    ///
    /// Fails with `InsufficientData` if every price is NaN and with
    /// `InvalidParameter` if the percentile bounds are out of order or range.
    pub fn from_prices(
        prices: Vec<f64>,
        lower_percentile: f64,
        upper_percentile: f64,
    ) -> Result<Self> {
        if !(0.0..=100.0).contains(&lower_percentile)
            || !(0.0..=100.0).contains(&upper_percentile)
            || lower_percentile > upper_percentile
        {
            return Err(Error::InvalidParameter(format!(
                "percentile bounds must satisfy 0 <= lower <= upper <= 100, got {} and {}",
                lower_percentile, upper_percentile
            )));
        }

        let sorted = sorted_without_nan(&prices);
        if sorted.is_empty() {
            return Err(Error::InsufficientData(
                "no defined terminal prices to summarize".to_string(),
            ));
        }

        let excluded = prices.len() - sorted.len();
        if excluded > 0 {
            warn!(excluded, "dropping NaN terminal prices from distribution");
        }

        let stat = |q: f64| percentile_of_sorted(&sorted, q).unwrap_or(f64::NAN);
        let lower_bound = stat(lower_percentile);
        let upper_bound = stat(upper_percentile);
        let median = stat(50.0);
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

        Ok(Self {
            prices,
            lower_percentile,
            upper_percentile,
            lower_bound,
            upper_bound,
            median,
            mean,
            excluded,
            sorted,
        })
    }

    /// Arbitrary percentile of the defined terminal prices.
    pub fn percentile(&self, q: f64) -> Option<f64> {
        percentile_of_sorted(&self.sorted, q)
    }

    /// Smallest defined terminal price.
    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    /// Largest defined terminal price.
    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    /// Bin the defined terminal prices into `bins` equal-width buckets.
    ///
    /// When every price is the same the range is widened to +/- 0.5 around it.
    pub fn histogram(&self, bins: usize) -> Result<Histogram> {
        if bins == 0 {
            return Err(Error::InvalidParameter(
                "histogram needs at least one bin".to_string(),
            ));
        }

        let (mut lo, mut hi) = (self.min(), self.max());
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0usize; bins];
        for &price in &self.sorted {
            let idx = (((price - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Histogram { edges, counts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_percentile_linear() {
        let values: Vec<f64> = (1..=10).map(|i| i as f64).collect();

        // position = 0.05 * 9 = 0.45 -> 1 + 0.45
        assert_relative_eq!(percentile(&values, 5.0).unwrap(), 1.45, epsilon = 1e-12);
        // position = 0.95 * 9 = 8.55 -> 9 + 0.55
        assert_relative_eq!(percentile(&values, 95.0).unwrap(), 9.55, epsilon = 1e-12);
        assert_eq!(percentile(&values, 50.0), Some(5.5));
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(10.0));
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let values = vec![9.0, 2.0, 7.0, 4.0, 1.0];
        assert_eq!(percentile(&values, 50.0), Some(4.0));
        assert_eq!(percentile(&values, 25.0), Some(2.0));
    }

    #[test]
    fn test_percentile_ignores_nan() {
        let values = vec![f64::NAN, 3.0, 1.0, f64::NAN, 2.0];
        assert_eq!(percentile(&values, 50.0), Some(2.0));
        assert_eq!(percentile(&values, 100.0), Some(3.0));
    }

    #[test]
    fn test_percentile_edge_cases() {
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentile(&[f64::NAN, f64::NAN], 50.0), None);
        assert_eq!(percentile(&[7.0], 5.0), Some(7.0));
        assert_eq!(percentile(&[1.0, 2.0], 101.0), None);
        assert_eq!(percentile(&[1.0, 2.0], -1.0), None);
    }

    #[test]
    fn test_distribution_bounds_ordered() {
        let prices: Vec<f64> = (0..200).map(|i| 100.0 + ((i * 37) % 101) as f64).collect();
        let dist = TerminalDistribution::from_prices(prices, 5.0, 95.0).unwrap();

        assert!(dist.lower_bound <= dist.median);
        assert!(dist.median <= dist.upper_bound);
        assert_eq!(dist.excluded, 0);
        assert_eq!(dist.prices.len(), 200);
    }

    #[test]
    fn test_distribution_excludes_nan() {
        let prices = vec![1.0, f64::NAN, 2.0, 3.0, f64::NAN];
        let dist = TerminalDistribution::from_prices(prices, 5.0, 95.0).unwrap();

        assert_eq!(dist.excluded, 2);
        assert_eq!(dist.prices.len(), 5);
        assert_relative_eq!(dist.mean, 2.0);
        assert_eq!(dist.median, 2.0);
        assert!(dist.lower_bound >= 1.0);
        assert!(dist.upper_bound <= 3.0);
    }

    #[test]
    fn test_distribution_all_nan() {
        let result = TerminalDistribution::from_prices(vec![f64::NAN; 4], 5.0, 95.0);
        assert!(matches!(result, Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_distribution_bad_bounds() {
        let result = TerminalDistribution::from_prices(vec![1.0, 2.0], 95.0, 5.0);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_histogram() {
        let prices = vec![1.0, 2.0, 2.5, 3.0, 4.0, 5.0];
        let dist = TerminalDistribution::from_prices(prices, 5.0, 95.0).unwrap();
        let hist = dist.histogram(4).unwrap();

        assert_eq!(hist.edges, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        // [1,2) [2,3) [3,4) [4,5]
        assert_eq!(hist.counts, vec![1, 2, 1, 2]);
        assert_eq!(hist.counts.iter().sum::<usize>(), 6);
    }

    #[test]
    fn test_histogram_single_value() {
        let dist = TerminalDistribution::from_prices(vec![50.0; 10], 5.0, 95.0).unwrap();
        let hist = dist.histogram(2).unwrap();

        assert_eq!(hist.edges, vec![49.5, 50.0, 50.5]);
        assert_eq!(hist.counts, vec![0, 10]);
        assert!(dist.histogram(0).is_err());
    }
}
