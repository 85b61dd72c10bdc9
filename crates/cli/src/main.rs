//! # volrange
//!
//! Command-line interface for volatility range forecasting.

mod loader;

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use volrange::{
    analyze, backtest_range, calibrate_k, normalize_records, project_range, validate_history, AnalysisConfig,
    Estimator, PriceHistory,
};

use crate::loader::load_records;

#[derive(Parser)]
#[command(name = "volrange")]
#[command(about = "Volatility range forecasting CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Parameter overrides shared by the history-driven commands.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// JSON configuration file (missing fields keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Horizon in trading days
    #[arg(long)]
    horizon: Option<usize>,

    /// Volatility estimator (std, ewma, robust)
    #[arg(short, long)]
    estimator: Option<Estimator>,

    /// Warm-up prices before the first backtest trial
    #[arg(long)]
    min_hist: Option<usize>,

    /// Minimum history rows
    #[arg(long)]
    min_rows: Option<usize>,

    /// Target coverage as a fraction (e.g. 0.8)
    #[arg(long)]
    target_coverage: Option<f64>,

    /// Smallest scale factor in the calibration scan
    #[arg(long)]
    k_min: Option<f64>,

    /// Largest scale factor in the calibration scan
    #[arg(long)]
    k_max: Option<f64>,

    /// Calibration scan step
    #[arg(long)]
    k_step: Option<f64>,

    /// EWMA decay factor
    #[arg(long)]
    ewma_decay: Option<f64>,

    /// Robust estimator clip width in sigmas
    #[arg(long)]
    robust_clip_k: Option<f64>,

    /// Minimum returns for the robust estimator
    #[arg(long)]
    robust_min_samples: Option<usize>,
}

impl Overrides {
    /// Load the configuration file (if any) and apply the flags on top.
    fn resolve(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        if let Some(estimator) = self.estimator {
            config.estimator = estimator;
        }
        if let Some(min_hist) = self.min_hist {
            config.min_hist = min_hist;
        }
        if let Some(min_rows) = self.min_rows {
            config.min_rows = min_rows;
        }
        if let Some(target) = self.target_coverage {
            config.target_coverage = target;
        }
        if let Some(k_min) = self.k_min {
            config.k_min = k_min;
        }
        if let Some(k_max) = self.k_max {
            config.k_max = k_max;
        }
        if let Some(k_step) = self.k_step {
            config.k_step = k_step;
        }
        if let Some(decay) = self.ewma_decay {
            config.estimators.ewma_decay = decay;
        }
        if let Some(clip_k) = self.robust_clip_k {
            config.estimators.robust_clip_k = clip_k;
        }
        if let Some(min_samples) = self.robust_min_samples {
            config.estimators.robust_min_samples = min_samples;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis: indicators, backtests, calibration and forecasts
    Analyze {
        /// Input file with date/close columns (CSV or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Reference price for the forecasts (default: last close)
        #[arg(short, long)]
        price: Option<f64>,

        /// Skip the scale-factor calibration
        #[arg(long)]
        no_calibrate: bool,

        /// Evaluate calibration candidates in parallel
        #[arg(long)]
        parallel: bool,

        #[command(flatten)]
        overrides: Overrides,

        /// Output file (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Walk-forward backtest of one estimator
    Backtest {
        /// Input file with date/close columns (CSV or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Volatility scale factor
        #[arg(short, long, default_value = "1.0")]
        k: f64,

        #[command(flatten)]
        overrides: Overrides,

        /// Output file (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search the scale factor reaching the target coverage
    Calibrate {
        /// Input file with date/close columns (CSV or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Evaluate candidates in parallel
        #[arg(long)]
        parallel: bool,

        #[command(flatten)]
        overrides: Overrides,

        /// Output file (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Project a range from a price and a daily volatility
    Project {
        /// Reference price
        #[arg(short, long)]
        price: f64,

        /// Daily volatility in percent
        #[arg(short, long)]
        volatility: f64,

        /// Horizon in trading days
        #[arg(long, default_value = "100")]
        horizon: usize,

        /// Volatility scale factor
        #[arg(short, long, default_value = "1.0")]
        k: f64,

        /// Output file (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Load, normalize and validate a price history.
fn load_history(path: &Path, min_rows: usize) -> anyhow::Result<PriceHistory> {
    let records = load_records(path).with_context(|| format!("loading {}", path.display()))?;
    let history = normalize_records(records)?;
    validate_history(&history, min_rows)
        .with_context(|| format!("{} usable rows, at least {} required", history.len(), min_rows))?;
    info!(
        rows = history.len(),
        first = ?history.first_date(),
        last = ?history.last_date(),
        "loaded {:?}",
        path.file_name().unwrap_or_default()
    );
    Ok(history)
}

/// Write results as pretty JSON to a file or stdout.
fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer_pretty(&mut file, value)?;
            info!("results written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn run_analyze(
    input: &Path,
    price: Option<f64>,
    no_calibrate: bool,
    parallel: bool,
    overrides: &Overrides,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut config = overrides.resolve()?;
    if no_calibrate {
        config.calibrate = false;
    }
    if parallel {
        config.parallel = true;
    }
    if let Some(p) = price {
        if !(p.is_finite() && p > 0.0) {
            bail!("reference price must be positive, got {}", p);
        }
    }

    let history = load_history(input, config.min_rows)?;
    let report = analyze(&history, price, &config);
    write_json(&report, output)
}

fn check_k(k: f64) -> anyhow::Result<()> {
    if !(k.is_finite() && k > 0.0) {
        bail!("k must be positive, got {}", k);
    }
    Ok(())
}

fn run_backtest(input: &Path, k: f64, overrides: &Overrides, output: Option<&Path>) -> anyhow::Result<()> {
    check_k(k)?;
    let config = overrides.resolve()?;
    let history = load_history(input, config.min_rows)?;

    let bt = config.backtest_config(config.estimator, k);
    let result = backtest_range(&history.closes(), &bt, &config.estimators);
    if result.is_none() {
        warn!(
            rows = history.len(),
            horizon = bt.horizon,
            min_hist = bt.min_hist,
            "no eligible backtest trials"
        );
    }
    write_json(&result, output)
}

fn run_calibrate(input: &Path, parallel: bool, overrides: &Overrides, output: Option<&Path>) -> anyhow::Result<()> {
    let config = overrides.resolve()?;
    let history = load_history(input, config.min_rows)?;

    let mut calibration = config.calibration_config();
    if parallel {
        calibration = calibration.parallel(true);
    }
    let outcome = calibrate_k(&history.closes(), &calibration, &config.estimators);
    match outcome.k() {
        Some(k) => info!(k, "calibrated"),
        None => warn!(evaluated = outcome.trace().len(), "no scale factor reached the target"),
    }
    write_json(&outcome, output)
}

fn run_project(price: f64, volatility: f64, horizon: usize, k: f64, output: Option<&Path>) -> anyhow::Result<()> {
    if !(price.is_finite() && price > 0.0) {
        bail!("price must be positive, got {}", price);
    }
    if !(volatility.is_finite() && volatility >= 0.0) {
        bail!("volatility must be non-negative, got {}", volatility);
    }
    check_k(k)?;
    let range = project_range(Some(price), Some(volatility), horizon, k);
    write_json(&range, output)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "volrange=info,volrange_core=info".into()),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            price,
            no_calibrate,
            parallel,
            overrides,
            output,
        } => run_analyze(&input, price, no_calibrate, parallel, &overrides, output.as_deref()),

        Commands::Backtest {
            input,
            k,
            overrides,
            output,
        } => run_backtest(&input, k, &overrides, output.as_deref()),

        Commands::Calibrate {
            input,
            parallel,
            overrides,
            output,
        } => run_calibrate(&input, parallel, &overrides, output.as_deref()),

        Commands::Project {
            price,
            volatility,
            horizon,
            k,
            output,
        } => run_project(price, volatility, horizon, k, output.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_prices(len: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Date,Close").unwrap();
        let start = chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        for i in 0..len {
            let date = start + chrono::Days::new(i as u64);
            let close = 40.0 + (i as f64 * 0.3).sin() * 2.0 + i as f64 * 0.01;
            writeln!(file, "{},{:.4}", date, close).unwrap();
        }
        file
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "volrange",
            "calibrate",
            "--input",
            "prices.csv",
            "--parallel",
            "--estimator",
            "rob",
            "--target-coverage",
            "0.9",
            "--k-step",
            "0.1",
        ])
        .unwrap();

        let Commands::Calibrate { parallel, overrides, .. } = cli.command else {
            panic!("expected calibrate");
        };
        assert!(parallel);
        let config = overrides.resolve().unwrap();
        assert_eq!(config.estimator, Estimator::Robust);
        assert_eq!(config.target_coverage, 0.9);
        assert_eq!(config.k_step, 0.1);
        assert_eq!(config.k_min, 0.6);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = Overrides {
            ewma_decay: Some(1.5),
            ..Default::default()
        };
        assert!(overrides.resolve().is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"horizon": 5, "min_hist": 30}}"#).unwrap();
        let overrides = Overrides {
            config: Some(file.path().to_path_buf()),
            horizon: Some(7),
            ..Default::default()
        };
        let config = overrides.resolve().unwrap();
        assert_eq!(config.horizon, 7);
        assert_eq!(config.min_hist, 30);
    }

    #[test]
    fn test_load_history_enforces_min_rows() {
        let file = write_prices(40);
        assert!(load_history(file.path(), 60).is_err());
        assert_eq!(load_history(file.path(), 30).unwrap().len(), 40);
    }

    #[test]
    fn test_analyze_writes_report() {
        let prices = write_prices(150);
        let out = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        run_analyze(prices.path(), None, false, true, &Overrides::default(), Some(out.path())).unwrap();

        let json: serde_json::Value = serde_json::from_reader(File::open(out.path()).unwrap()).unwrap();
        assert_eq!(json["rows"], 150);
        assert!(json["backtests"]["ewma"].is_object());
        assert!(json["calibration"].is_object());
    }

    #[test]
    fn test_project_writes_range() {
        let out = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        run_project(100.0, 2.0, 100, 1.0, Some(out.path())).unwrap();

        let json: serde_json::Value = serde_json::from_reader(File::open(out.path()).unwrap()).unwrap();
        assert_eq!(json["low"], 80.0);
        assert_eq!(json["high"], 120.0);
        assert!(run_project(-1.0, 2.0, 100, 1.0, None).is_err());
    }

    #[test]
    fn test_non_positive_k_rejected() {
        for k in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            assert!(run_project(100.0, 2.0, 100, k, None).is_err());
        }
        let prices = write_prices(120);
        assert!(run_backtest(prices.path(), -1.0, &Overrides::default(), None).is_err());
    }

    #[test]
    fn test_analyze_keeps_config_file_switches() {
        let prices = write_prices(150);
        let mut config = tempfile::NamedTempFile::new().unwrap();
        write!(config, r#"{{"calibrate": false}}"#).unwrap();
        let overrides = Overrides {
            config: Some(config.path().to_path_buf()),
            ..Default::default()
        };

        let out = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        run_analyze(prices.path(), None, false, false, &overrides, Some(out.path())).unwrap();
        let json: serde_json::Value = serde_json::from_reader(File::open(out.path()).unwrap()).unwrap();
        assert!(json.get("calibration").is_none());
        assert!(json["forecasts"]["calibrated"].is_null());
    }

    #[test]
    fn test_calibrate_keeps_config_file_parallel() {
        let prices = write_prices(150);
        let mut config = tempfile::NamedTempFile::new().unwrap();
        write!(config, r#"{{"parallel": true}}"#).unwrap();
        let overrides = Overrides {
            config: Some(config.path().to_path_buf()),
            ..Default::default()
        };
        assert!(overrides.resolve().unwrap().calibration_config().parallel);

        let out = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        run_calibrate(prices.path(), false, &overrides, Some(out.path())).unwrap();
        let json: serde_json::Value = serde_json::from_reader(File::open(out.path()).unwrap()).unwrap();
        assert!(json["status"].is_string());
    }
}
