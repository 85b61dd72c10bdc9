//! Volatility range configuration types.

use std::path::Path;

use serde::{Deserialize, Serialize};
use volrange_spi::{Estimator, Result, VolRangeError};

/// Finest scan step; candidates are rounded to three decimals.
pub const MIN_K_STEP: f64 = 0.001;

/// Upper bound on the number of factors one calibration scan may evaluate.
pub const MAX_K_CANDIDATES: usize = 10_000;

// ============================================================================
// Estimator Configuration
// ============================================================================

/// Tuning shared by the volatility estimators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// EWMA decay factor (lambda).
    pub ewma_decay: f64,
    /// Winsorization width in robust sigmas.
    pub robust_clip_k: f64,
    /// Minimum log-returns before the robust estimator answers.
    pub robust_min_samples: usize,
}

impl EstimatorConfig {
    pub fn new(ewma_decay: f64, robust_clip_k: f64, robust_min_samples: usize) -> Self {
        Self {
            ewma_decay,
            robust_clip_k,
            robust_min_samples,
        }
    }

    pub fn with_ewma_decay(mut self, decay: f64) -> Self {
        self.ewma_decay = decay;
        self
    }

    pub fn with_robust_clip_k(mut self, clip_k: f64) -> Self {
        self.robust_clip_k = clip_k;
        self
    }

    pub fn with_robust_min_samples(mut self, min_samples: usize) -> Self {
        self.robust_min_samples = min_samples;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.ewma_decay) {
            return Err(VolRangeError::invalid_parameter("ewma_decay", "must be in [0, 1)"));
        }
        if !(self.robust_clip_k > 0.0 && self.robust_clip_k.is_finite()) {
            return Err(VolRangeError::invalid_parameter("robust_clip_k", "must be positive"));
        }
        if self.robust_min_samples < 2 {
            return Err(VolRangeError::invalid_parameter("robust_min_samples", "must be at least 2"));
        }
        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            ewma_decay: 0.94,
            robust_clip_k: 3.0,
            robust_min_samples: 10,
        }
    }
}

// ============================================================================
// Projection Configuration
// ============================================================================

/// Range projection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Trading days ahead.
    pub horizon: usize,
    /// Volatility scale factor.
    pub k: f64,
}

impl ProjectionConfig {
    pub fn new(horizon: usize, k: f64) -> Self {
        Self { horizon, k }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { horizon: 100, k: 1.0 }
    }
}

// ============================================================================
// Backtest Configuration
// ============================================================================

/// Walk-forward backtest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Days between the projection and the realized price.
    pub horizon: usize,
    /// Volatility scale factor.
    pub k: f64,
    pub estimator: Estimator,
    /// Warm-up prices before the first trial.
    pub min_hist: usize,
}

impl BacktestConfig {
    pub fn new(horizon: usize, k: f64, estimator: Estimator) -> Self {
        Self {
            horizon,
            k,
            estimator,
            ..Self::default()
        }
    }

    pub fn with_min_hist(mut self, min_hist: usize) -> Self {
        self.min_hist = min_hist;
        self
    }

    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    pub fn with_estimator(mut self, estimator: Estimator) -> Self {
        self.estimator = estimator;
        self
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            horizon: 10,
            k: 1.0,
            estimator: Estimator::Ewma,
            min_hist: 60,
        }
    }
}

// ============================================================================
// Calibration Configuration
// ============================================================================

/// Scale-factor scan configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub horizon: usize,
    pub estimator: Estimator,
    pub min_hist: usize,
    /// Target coverage as a fraction (0.80 = 80%).
    pub target_coverage: f64,
    pub k_min: f64,
    pub k_max: f64,
    pub k_step: f64,
    /// Evaluate candidates concurrently.
    pub parallel: bool,
}

impl CalibrationConfig {
    pub fn new(horizon: usize, estimator: Estimator, target_coverage: f64) -> Self {
        Self {
            horizon,
            estimator,
            target_coverage,
            ..Self::default()
        }
    }

    pub fn with_scan(mut self, k_min: f64, k_max: f64, k_step: f64) -> Self {
        self.k_min = k_min;
        self.k_max = k_max;
        self.k_step = k_step;
        self
    }

    pub fn with_min_hist(mut self, min_hist: usize) -> Self {
        self.min_hist = min_hist;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Backtest configuration for one candidate factor.
    pub fn backtest_config(&self, k: f64) -> BacktestConfig {
        BacktestConfig {
            horizon: self.horizon,
            k,
            estimator: self.estimator,
            min_hist: self.min_hist,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.target_coverage > 0.0 && self.target_coverage <= 1.0) {
            return Err(VolRangeError::invalid_parameter("target_coverage", "must be in (0, 1]"));
        }
        if !(self.k_min > 0.0 && self.k_min.is_finite()) {
            return Err(VolRangeError::invalid_parameter("k_min", "must be positive"));
        }
        if !(self.k_step > 0.0 && self.k_step.is_finite()) {
            return Err(VolRangeError::invalid_parameter("k_step", "must be positive"));
        }
        if self.k_step < MIN_K_STEP {
            return Err(VolRangeError::invalid_parameter(
                "k_step",
                format!("must be at least {}", MIN_K_STEP),
            ));
        }
        if !(self.k_max >= self.k_min && self.k_max.is_finite()) {
            return Err(VolRangeError::invalid_parameter("k_max", "must be >= k_min"));
        }
        if (self.k_max - self.k_min) / self.k_step >= MAX_K_CANDIDATES as f64 {
            return Err(VolRangeError::invalid_parameter(
                "k_max",
                format!("scan exceeds {} candidates", MAX_K_CANDIDATES),
            ));
        }
        Ok(())
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            horizon: 10,
            estimator: Estimator::Ewma,
            min_hist: 60,
            target_coverage: 0.80,
            k_min: 0.6,
            k_max: 3.0,
            k_step: 0.05,
            parallel: false,
        }
    }
}

// ============================================================================
// Indicator Configuration
// ============================================================================

/// Volatility/drawdown cut-offs for the risk bucket (both in percent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub low_volatility: f64,
    pub low_drawdown: f64,
    pub medium_volatility: f64,
    pub medium_drawdown: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_volatility: 2.0,
            low_drawdown: 10.0,
            medium_volatility: 4.0,
            medium_drawdown: 20.0,
        }
    }
}

/// Descriptive indicator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub rsi_period: usize,
    pub risk: RiskThresholds,
}

impl IndicatorConfig {
    pub fn with_periods(mut self, fast_period: usize, slow_period: usize) -> Self {
        self.fast_period = fast_period;
        self.slow_period = slow_period;
        self
    }

    pub fn with_rsi_period(mut self, rsi_period: usize) -> Self {
        self.rsi_period = rsi_period;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.fast_period == 0 || self.slow_period == 0 {
            return Err(VolRangeError::invalid_parameter("fast_period/slow_period", "must be positive"));
        }
        if self.rsi_period == 0 {
            return Err(VolRangeError::invalid_parameter("rsi_period", "must be positive"));
        }
        Ok(())
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            fast_period: 20,
            slow_period: 60,
            rsi_period: 14,
            risk: RiskThresholds::default(),
        }
    }
}

// ============================================================================
// Analysis Configuration
// ============================================================================

/// Every parameter the analysis exposes to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Days ahead for forecasts and backtests.
    pub horizon: usize,
    /// Estimator used for calibration.
    pub estimator: Estimator,
    pub min_hist: usize,
    /// Minimum rows a history needs before it is analyzed.
    pub min_rows: usize,
    pub target_coverage: f64,
    pub k_min: f64,
    pub k_max: f64,
    pub k_step: f64,
    /// Run the scale-factor calibration.
    pub calibrate: bool,
    pub parallel: bool,
    #[serde(flatten)]
    pub estimators: EstimatorConfig,
    pub indicators: IndicatorConfig,
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_estimator(mut self, estimator: Estimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_min_hist(mut self, min_hist: usize) -> Self {
        self.min_hist = min_hist;
        self
    }

    pub fn with_target_coverage(mut self, target_coverage: f64) -> Self {
        self.target_coverage = target_coverage;
        self
    }

    pub fn with_scan(mut self, k_min: f64, k_max: f64, k_step: f64) -> Self {
        self.k_min = k_min;
        self.k_max = k_max;
        self.k_step = k_step;
        self
    }

    pub fn with_estimators(mut self, estimators: EstimatorConfig) -> Self {
        self.estimators = estimators;
        self
    }

    pub fn with_calibration(mut self, calibrate: bool) -> Self {
        self.calibrate = calibrate;
        self
    }

    /// Backtest configuration for `estimator` at scale factor `k`.
    pub fn backtest_config(&self, estimator: Estimator, k: f64) -> BacktestConfig {
        BacktestConfig {
            horizon: self.horizon,
            k,
            estimator,
            min_hist: self.min_hist,
        }
    }

    pub fn calibration_config(&self) -> CalibrationConfig {
        CalibrationConfig {
            horizon: self.horizon,
            estimator: self.estimator,
            min_hist: self.min_hist,
            target_coverage: self.target_coverage,
            k_min: self.k_min,
            k_max: self.k_max,
            k_step: self.k_step,
            parallel: self.parallel,
        }
    }

    pub fn projection_config(&self, k: f64) -> ProjectionConfig {
        ProjectionConfig::new(self.horizon, k)
    }

    pub fn validate(&self) -> Result<()> {
        self.estimators.validate()?;
        self.indicators.validate()?;
        self.calibration_config().validate()
    }

    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| VolRangeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| VolRangeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            horizon: 10,
            estimator: Estimator::Ewma,
            min_hist: 60,
            min_rows: 60,
            target_coverage: 0.80,
            k_min: 0.6,
            k_max: 3.0,
            k_step: 0.05,
            calibrate: true,
            parallel: false,
            estimators: EstimatorConfig::default(),
            indicators: IndicatorConfig::default(),
        }
    }
}
