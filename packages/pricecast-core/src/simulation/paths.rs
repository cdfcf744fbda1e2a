//! Geometric Brownian Motion path generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::SimulationEnsemble;
use crate::config::SimulationConfig;
use crate::returns::ReturnStatistics;
use crate::{Error, Result};

/// Monte Carlo simulator driven by historical log-return statistics.
///
/// Each step multiplies the previous price by `exp(z)` with
/// `z ~ Normal(mean, std_dev)` of the historical log-returns.
#[derive(Debug, Clone)]
pub struct PathSimulator {
    stats: ReturnStatistics,
    config: SimulationConfig,
}

impl PathSimulator {
    pub fn new(stats: ReturnStatistics, config: SimulationConfig) -> Self {
        Self { stats, config }
    }

    pub fn stats(&self) -> &ReturnStatistics {
        &self.stats
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate `config.simulations` paths of `horizon` steps from `start_price`.
    ///
    /// Uses `config.seed` when set, otherwise seeds from OS entropy once the
    /// parameters have been accepted.
    pub fn simulate(&self, start_price: f64, horizon: i64) -> Result<SimulationEnsemble> {
        self.validate(start_price, horizon)?;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.simulate_with_rng(start_price, horizon, &mut rng)
    }

    /// Simulate with a caller-supplied master generator.
    ///
    /// The master generator only hands out one seed per path; each path then
    /// draws from its own generator. Results are therefore identical with or
    /// without the `parallel` feature. Parameters are validated before the
    /// generator is touched.
    pub fn simulate_with_rng<R: Rng>(
        &self,
        start_price: f64,
        horizon: i64,
        rng: &mut R,
    ) -> Result<SimulationEnsemble> {
        let steps = self.validate(start_price, horizon)?;

        let normal = Normal::new(self.stats.mean, self.stats.std_dev)
            .map_err(|e| Error::InvalidParameter(format!("return distribution: {}", e)))?;

        debug!(
            simulations = self.config.simulations,
            horizon = steps,
            start_price,
            mean = self.stats.mean,
            std_dev = self.stats.std_dev,
            "starting path simulation"
        );

        let seeds: Vec<u64> = (0..self.config.simulations).map(|_| rng.gen()).collect();
        let paths = map_seeds(
            &seeds,
            |&seed| simulate_path(start_price, steps, &normal, seed),
            self.config.force_sequential,
        );

        info!(
            simulations = paths.len(),
            horizon = steps,
            "path simulation complete"
        );

        Ok(SimulationEnsemble::new(start_price, steps, paths))
    }

    fn validate(&self, start_price: f64, horizon: i64) -> Result<usize> {
        if self.config.simulations == 0 {
            return Err(Error::InvalidParameter(
                "simulation count must be positive".to_string(),
            ));
        }

        if horizon < 0 {
            return Err(Error::InvalidParameter(format!(
                "horizon must not be negative, got {}",
                horizon
            )));
        }

        if !start_price.is_finite() || start_price <= 0.0 {
            return Err(Error::InvalidPrice(format!(
                "start price must be positive, got {}",
                start_price
            )));
        }

        let stats = &self.stats;
        if !stats.mean.is_finite() || !stats.std_dev.is_finite() || stats.std_dev < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "return statistics must be finite with non-negative std_dev, got mean={} std_dev={}",
                stats.mean, stats.std_dev
            )));
        }

        usize::try_from(horizon)
            .map_err(|_| Error::InvalidParameter(format!("horizon {} is too large", horizon)))
    }
}

/// One path of `steps + 1` prices from its own seeded generator.
fn simulate_path(start_price: f64, steps: usize, normal: &Normal<f64>, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut path = Vec::with_capacity(steps + 1);
    let mut price = start_price;
    path.push(price);

    for _ in 0..steps {
        let z = normal.sample(&mut rng);
        price *= z.exp();
        path.push(price);
    }

    path
}

/// Map over path seeds, on rayon's pool when the `parallel` feature is on.
///
/// Output order always matches seed order.
fn map_seeds<F>(seeds: &[u64], f: F, force_sequential: bool) -> Vec<Vec<f64>>
where
    F: Fn(&u64) -> Vec<f64> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if force_sequential {
            seeds.iter().map(f).collect()
        } else {
            seeds.par_iter().map(f).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = force_sequential;
        seeds.iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::RngCore;

    /// Random source that counts how often it is asked for bits.
    struct CountingRng {
        inner: StdRng,
        calls: usize,
    }

    impl CountingRng {
        fn new() -> Self {
            Self {
                inner: StdRng::seed_from_u64(0),
                calls: 0,
            }
        }
    }

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            self.calls += 1;
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.calls += 1;
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.calls += 1;
            self.inner.fill_bytes(dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.calls += 1;
            self.inner.try_fill_bytes(dest)
        }
    }

    fn simulator(mean: f64, std_dev: f64, simulations: usize, seed: u64) -> PathSimulator {
        PathSimulator::new(
            ReturnStatistics::new(mean, std_dev).unwrap(),
            SimulationConfig {
                simulations,
                seed: Some(seed),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_zero_horizon() {
        for simulations in [1, 7, 100] {
            let ensemble = simulator(0.001, 0.02, simulations, 1)
                .simulate(42.0, 0)
                .unwrap();

            assert_eq!(ensemble.paths().len(), simulations);
            assert!(ensemble.paths().iter().all(|p| p == &vec![42.0]));
        }
    }

    #[test]
    fn test_flat_paths() {
        let ensemble = simulator(0.0, 0.0, 10, 3).simulate(50.0, 3).unwrap();

        assert_eq!(ensemble.paths().len(), 10);
        for path in ensemble.paths() {
            assert_eq!(path, &vec![50.0, 50.0, 50.0, 50.0]);
        }
    }

    #[test]
    fn test_zero_volatility_is_deterministic() {
        let mean = 0.01;
        let ensemble = simulator(mean, 0.0, 25, 9).simulate(100.0, 20).unwrap();

        let first = &ensemble.paths()[0];
        for path in ensemble.paths() {
            assert_eq!(path, first);
        }
        for (j, &price) in first.iter().enumerate() {
            assert_relative_eq!(price, 100.0 * mean.exp().powi(j as i32), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_path_shape() {
        let ensemble = simulator(0.0005, 0.015, 64, 11).simulate(10.0, 30).unwrap();

        assert_eq!(ensemble.horizon(), 30);
        assert_eq!(ensemble.start_price(), 10.0);
        for path in ensemble.paths() {
            assert_eq!(path.len(), 31);
            assert_eq!(path[0], 10.0);
            assert!(path.iter().all(|&p| p > 0.0 && p.is_finite()));
        }
    }

    #[test]
    fn test_paths_are_independent() {
        let ensemble = simulator(0.0, 0.02, 50, 5).simulate(100.0, 10).unwrap();
        let terminals = ensemble.terminal_prices();

        let first = terminals[0];
        assert!(terminals.iter().any(|&t| t != first));
    }

    #[test]
    fn test_seed_reproducible() {
        let a = simulator(0.0002, 0.01, 40, 1234).simulate(75.0, 15).unwrap();
        let b = simulator(0.0002, 0.01, 40, 1234).simulate(75.0, 15).unwrap();
        let c = simulator(0.0002, 0.01, 40, 4321).simulate(75.0, 15).unwrap();

        assert_eq!(a.paths(), b.paths());
        assert_ne!(a.paths(), c.paths());
    }

    #[test]
    fn test_sequential_matches_default() {
        let stats = ReturnStatistics::new(0.0003, 0.012).unwrap();
        let config = SimulationConfig {
            simulations: 64,
            seed: Some(77),
            ..Default::default()
        };
        let sequential = SimulationConfig {
            force_sequential: true,
            ..config.clone()
        };

        let a = PathSimulator::new(stats, config).simulate(20.0, 12).unwrap();
        let b = PathSimulator::new(stats, sequential)
            .simulate(20.0, 12)
            .unwrap();

        assert_eq!(a.paths(), b.paths());
    }

    #[test]
    fn test_negative_horizon_draws_nothing() {
        let mut counter = CountingRng::new();
        let result = simulator(0.0, 0.01, 10, 0).simulate_with_rng(100.0, -1, &mut counter);

        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert_eq!(counter.calls, 0);
    }

    #[test]
    fn test_zero_simulations_draws_nothing() {
        let mut counter = CountingRng::new();
        let result = simulator(0.0, 0.01, 0, 0).simulate_with_rng(100.0, 5, &mut counter);

        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert_eq!(counter.calls, 0);
    }

    #[test]
    fn test_master_rng_draws_once_per_path() {
        let mut counter = CountingRng::new();
        simulator(0.0, 0.01, 10, 0)
            .simulate_with_rng(100.0, 5, &mut counter)
            .unwrap();

        assert_eq!(counter.calls, 10);
    }

    #[test]
    fn test_unseeded_rejects_before_seeding() {
        let stats = ReturnStatistics::new(0.0, 0.01).unwrap();
        let unseeded = SimulationConfig {
            simulations: 10,
            seed: None,
            ..Default::default()
        };
        let sim = PathSimulator::new(stats, unseeded.clone());
        assert!(matches!(sim.simulate(100.0, -1), Err(Error::InvalidParameter(_))));
        assert!(matches!(sim.simulate(-1.0, 5), Err(Error::InvalidPrice(_))));

        let empty = SimulationConfig {
            simulations: 0,
            ..unseeded
        };
        let sim = PathSimulator::new(stats, empty);
        assert!(matches!(sim.simulate(100.0, 5), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_invalid_start_price() {
        let sim = simulator(0.0, 0.01, 10, 0);
        assert!(matches!(sim.simulate(0.0, 5), Err(Error::InvalidPrice(_))));
        assert!(matches!(sim.simulate(f64::NAN, 5), Err(Error::InvalidPrice(_))));
    }

    #[test]
    fn test_invalid_stats_rejected() {
        // Struct literal bypasses ReturnStatistics::new
        let stats = ReturnStatistics {
            mean: 0.0,
            std_dev: f64::NAN,
            observations: 3,
        };
        let sim = PathSimulator::new(stats, SimulationConfig::default());
        assert!(matches!(sim.simulate(10.0, 5), Err(Error::InvalidParameter(_))));
    }
}
