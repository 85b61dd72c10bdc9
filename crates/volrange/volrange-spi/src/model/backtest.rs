//! Walk-forward backtest result model.

use serde::{Deserialize, Serialize};

use super::Estimator;

/// Aggregate score of one (estimator, horizon, k) configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestResult {
    pub estimator: Estimator,
    pub horizon: usize,
    pub k: f64,
    /// Number of eligible trials.
    pub trials: usize,
    /// Trials whose realized price fell inside the projected range.
    pub hits: usize,
    /// Hit rate in percent, 2 decimals.
    pub coverage: f64,
    /// Mean range width in price units, 2 decimals.
    pub mean_width: f64,
    /// Mean width divided by coverage as a fraction; `None` when coverage is zero.
    pub sharpness: Option<f64>,
}

impl BacktestResult {
    /// Whether the coverage reaches `target` (a fraction, e.g. 0.80).
    pub fn meets(&self, target: f64) -> bool {
        self.coverage >= target * 100.0
    }
}
