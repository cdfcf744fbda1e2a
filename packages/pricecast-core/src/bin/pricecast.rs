//! Pricecast CLI - Command line interface for price forecasting.
//!
//! Every command prints a JSON `ApiResponse` envelope on stdout; logs go to
//! stderr and are controlled with `RUST_LOG`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pricecast_core::{
    forecast, history_window, horizon_for, ApiResponse, ForecastConfig, ForecastRequest,
    IndicatorSeries, JsonFileSource, PathSimulator, PriceBar, PriceSeries, PriceSource,
    ReturnStatistics,
};

#[derive(Parser)]
#[command(name = "pricecast")]
#[command(about = "Pricecast CLI - Monte Carlo price forecasts and technical indicators")]
#[command(version)]
struct Cli {
    /// Config file (defaults to PRICECAST_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log-return statistics of a price file
    Stats {
        /// JSON price file (array of bars)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// EMA, RSI and MACD of a price file
    Indicators {
        /// JSON price file (array of bars)
        #[arg(short, long)]
        file: PathBuf,
        /// Only output the trailing N trading days
        #[arg(short, long)]
        last: Option<usize>,
    },
    /// Monte Carlo simulation from a price file
    Simulate {
        /// JSON price file (array of bars)
        #[arg(short, long)]
        file: PathBuf,
        /// Date to forecast (YYYY-MM-DD)
        #[arg(short, long)]
        target_date: NaiveDate,
        /// Reference day for the horizon (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Number of simulated paths
        #[arg(short = 'n', long)]
        simulations: Option<usize>,
        /// Seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,
        /// Histogram bins for terminal prices
        #[arg(long, default_value = "200")]
        bins: usize,
        /// Include every simulated path in the output
        #[arg(long)]
        paths: bool,
    },
    /// Full forecast for a symbol from the configured data directory
    Forecast {
        /// Ticker symbol
        #[arg(short = 'y', long)]
        symbol: String,
        /// Date to forecast (YYYY-MM-DD)
        #[arg(short, long)]
        target_date: NaiveDate,
        /// Reference day for the horizon (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ForecastConfig::load_from_path(path),
        None => ForecastConfig::load(),
    }
    .context("failed to load configuration")?;

    let output = match cli.command {
        Commands::Stats { file } => handle_stats(&file),
        Commands::Indicators { file, last } => handle_indicators(&file, last, &config),
        Commands::Simulate {
            file,
            target_date,
            today,
            simulations,
            seed,
            bins,
            paths,
        } => handle_simulate(
            &file,
            target_date,
            today,
            simulations,
            seed,
            bins,
            paths,
            config,
        ),
        Commands::Forecast {
            symbol,
            target_date,
            today,
            seed,
        } => handle_forecast(&symbol, target_date, today, seed, config),
    };

    println!("{}", output);
    Ok(())
}

/// Render a result as a pretty JSON envelope.
fn respond<T: Serialize>(result: pricecast_core::Result<T>) -> String {
    let rendered = match result {
        Ok(data) => serde_json::to_string_pretty(&ApiResponse::ok(data)),
        Err(e) => {
            tracing::error!(error = %e, "request failed");
            serde_json::to_string_pretty(&ApiResponse::<()>::err(e.to_string()))
        }
    };
    rendered.unwrap_or_else(|e| format!("{{\"ok\":false,\"error\":\"{}\"}}", e))
}

fn load_file(path: &Path) -> pricecast_core::Result<PriceSeries> {
    let symbol = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let content = fs::read_to_string(path)?;
    let bars: Vec<PriceBar> = serde_json::from_str(&content)?;
    PriceSeries::new(&symbol, bars)
}

fn today_or(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

fn handle_stats(file: &Path) -> String {
    respond(load_file(file).and_then(|series| {
        let stats = ReturnStatistics::from_series(&series)?;
        Ok(json!({
            "symbol": series.symbol(),
            "bars": series.len(),
            "statistics": stats,
            "annualized_drift": stats.annualized_drift(),
            "annualized_volatility": stats.annualized_volatility(),
        }))
    }))
}

fn handle_indicators(file: &Path, last: Option<usize>, config: &ForecastConfig) -> String {
    respond(load_file(file).and_then(|series| {
        let indicators = IndicatorSeries::compute(&series, &config.indicators)?;
        let window = last.unwrap_or(config.analysis_window);
        Ok(json!({
            "symbol": series.symbol(),
            "indicators": indicators.tail(window),
        }))
    }))
}

#[allow(clippy::too_many_arguments)]
fn handle_simulate(
    file: &Path,
    target_date: NaiveDate,
    today: Option<NaiveDate>,
    simulations: Option<usize>,
    seed: Option<u64>,
    bins: usize,
    include_paths: bool,
    mut config: ForecastConfig,
) -> String {
    if let Some(n) = simulations {
        config.simulation.simulations = n;
    }
    if seed.is_some() {
        config.simulation.seed = seed;
    }

    respond(load_file(file).and_then(|series| {
        config.validate()?;
        let request = ForecastRequest::new(today_or(today), target_date);
        let horizon = horizon_for(request.today, request.target_date, config.max_horizon_days)?;

        let stats = ReturnStatistics::from_series(&series)?;
        let ensemble = PathSimulator::new(stats, config.simulation.clone())
            .simulate(series.last_close(), horizon as i64)?;
        let distribution = ensemble.terminal_distribution(
            config.simulation.lower_percentile,
            config.simulation.upper_percentile,
        )?;
        let histogram = distribution.histogram(bins)?;

        let mut body = json!({
            "symbol": series.symbol(),
            "horizon": horizon,
            "start_price": ensemble.start_price(),
            "statistics": stats,
            "lower_bound": distribution.lower_bound,
            "upper_bound": distribution.upper_bound,
            "median": distribution.median,
            "mean": distribution.mean,
            "histogram": histogram,
        });
        if include_paths {
            if let Some(anchor) = series.last_date() {
                body["step_dates"] = json!(ensemble.step_dates(anchor));
            }
            body["paths"] = json!(ensemble.paths());
        }
        Ok(body)
    }))
}

fn handle_forecast(
    symbol: &str,
    target_date: NaiveDate,
    today: Option<NaiveDate>,
    seed: Option<u64>,
    mut config: ForecastConfig,
) -> String {
    if seed.is_some() {
        config.simulation.seed = seed;
    }

    let today = today_or(today);
    let source = JsonFileSource::new(config.resolved_data_dir());
    let series = history_window(today, config.lookback_years)
        .and_then(|(start, end)| source.fetch(symbol, start, end));

    respond(series.and_then(|series| {
        let request = ForecastRequest::new(today, target_date);
        let result = forecast(&series, &request, &config)?;
        Ok(json!({
            "symbol": result.symbol,
            "horizon": result.horizon,
            "start_price": result.start_price,
            "statistics": result.statistics,
            "distribution": {
                "lower_percentile": result.distribution.lower_percentile,
                "upper_percentile": result.distribution.upper_percentile,
                "lower_bound": result.distribution.lower_bound,
                "upper_bound": result.distribution.upper_bound,
                "median": result.distribution.median,
                "mean": result.distribution.mean,
            },
            "indicators": result.indicators.tail(config.analysis_window),
        }))
    }))
}
