//! Walk-forward range backtesting.
//!
//! At every eligible index `t` the volatility is estimated from the prices
//! strictly before `t`, a range is projected from `closes[t]`, and the trial
//! is a hit when `closes[t + horizon]` lands inside it.

use tracing::debug;
use volrange_api::{BacktestConfig, EstimatorConfig};
use volrange_spi::{BacktestResult, Backtester, Estimator, VolatilityEstimator};

use crate::projection::range_bounds;
use crate::volatility::{create_estimator, round2};

/// One eligible walk-forward trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trial {
    /// Index of the projection day.
    pub index: usize,
    /// Price the range is projected from.
    pub price: f64,
    /// Price `horizon` days later.
    pub realized: f64,
    /// Volatility estimated from `closes[..index]`.
    pub vol_pct: f64,
}

impl Trial {
    /// Unrounded range bounds at scale factor `k`.
    pub fn bounds(&self, horizon: usize, k: f64) -> (f64, f64) {
        range_bounds(self.price, self.vol_pct, horizon, k)
    }

    pub fn is_hit(&self, horizon: usize, k: f64) -> bool {
        let (low, high) = self.bounds(horizon, k);
        low <= self.realized && self.realized <= high
    }
}

/// Precomputed trials for one (estimator, horizon, min_hist) triple.
///
/// The volatility path does not depend on `k`, so a plan scores any number
/// of scale factors without re-estimating.
#[derive(Debug, Clone)]
pub struct WalkForwardPlan {
    estimator: Estimator,
    horizon: usize,
    trials: Vec<Trial>,
}

impl WalkForwardPlan {
    pub fn new(closes: &[f64], estimator: &dyn VolatilityEstimator, horizon: usize, min_hist: usize) -> Self {
        let end = closes.len().saturating_sub(horizon);
        // A prefix of `t` prices holds at most `t - 1` returns.
        let start = min_hist.max(estimator.min_returns() + 1);
        let trials = (start..end)
            .filter_map(|t| {
                let vol_pct = estimator.estimate(&closes[..t])?;
                Some(Trial {
                    index: t,
                    price: closes[t],
                    realized: closes[t + horizon],
                    vol_pct,
                })
            })
            .collect();

        Self {
            estimator: estimator.kind(),
            horizon,
            trials,
        }
    }

    /// Build a plan from configuration.
    pub fn from_config(closes: &[f64], config: &BacktestConfig, estimators: &EstimatorConfig) -> Self {
        let estimator = create_estimator(config.estimator, estimators);
        Self::new(closes, estimator.as_ref(), config.horizon, config.min_hist)
    }

    pub fn estimator(&self) -> Estimator {
        self.estimator
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Score the plan at scale factor `k`; `None` without eligible trials.
    pub fn score(&self, k: f64) -> Option<BacktestResult> {
        if self.trials.is_empty() {
            debug!(
                estimator = %self.estimator,
                horizon = self.horizon,
                "backtest has no eligible trials"
            );
            return None;
        }

        let mut hits = 0usize;
        let mut width_sum = 0.0;
        for trial in &self.trials {
            let (low, high) = trial.bounds(self.horizon, k);
            width_sum += high - low;
            if low <= trial.realized && trial.realized <= high {
                hits += 1;
            }
        }

        let trials = self.trials.len();
        let coverage = hits as f64 / trials as f64;
        let mean_width = width_sum / trials as f64;

        Some(BacktestResult {
            estimator: self.estimator,
            horizon: self.horizon,
            k,
            trials,
            hits,
            coverage: round2(coverage * 100.0),
            mean_width: round2(mean_width),
            sharpness: if coverage > 0.0 {
                Some(round2(mean_width / coverage))
            } else {
                None
            },
        })
    }
}

/// Backtester configured with an estimator, horizon and warm-up length.
#[derive(Debug, Clone, Default)]
pub struct WalkForwardBacktester {
    config: BacktestConfig,
    estimators: EstimatorConfig,
}

impl WalkForwardBacktester {
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            config,
            estimators: EstimatorConfig::default(),
        }
    }

    pub fn with_estimators(mut self, estimators: EstimatorConfig) -> Self {
        self.estimators = estimators;
        self
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Precompute the trials for `closes`.
    pub fn plan(&self, closes: &[f64]) -> WalkForwardPlan {
        WalkForwardPlan::from_config(closes, &self.config, &self.estimators)
    }

    /// Run at the configured scale factor.
    pub fn backtest(&self, closes: &[f64]) -> Option<BacktestResult> {
        self.run(closes, self.config.k)
    }
}

impl Backtester for WalkForwardBacktester {
    fn run(&self, closes: &[f64], k: f64) -> Option<BacktestResult> {
        self.plan(closes).score(k)
    }
}

/// Run one walk-forward backtest.
pub fn backtest_range(closes: &[f64], config: &BacktestConfig, estimators: &EstimatorConfig) -> Option<BacktestResult> {
    WalkForwardPlan::from_config(closes, config, estimators).score(config.k)
}
