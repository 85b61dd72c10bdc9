//! Backtester trait.

use crate::model::BacktestResult;

/// Walk-forward range backtest engine.
pub trait Backtester: Send + Sync {
    /// Score ranges scaled by `k` against the realized closes.
    ///
    /// Returns `None` when no trial is eligible.
    fn run(&self, closes: &[f64], k: f64) -> Option<BacktestResult>;
}
