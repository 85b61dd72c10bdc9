//! Calibration outcome model.

use serde::{Deserialize, Serialize};

use super::BacktestResult;

/// Result of a scale-factor search.
///
/// The trace lists every evaluated candidate in scan order; candidates whose
/// backtest had no eligible trials are not recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CalibrationOutcome {
    /// The first scanned factor reaching the target coverage.
    Calibrated {
        k: f64,
        result: BacktestResult,
        trace: Vec<BacktestResult>,
    },
    /// No factor in the scan range reached the target.
    Missed { trace: Vec<BacktestResult> },
}

impl CalibrationOutcome {
    pub fn k(&self) -> Option<f64> {
        match self {
            CalibrationOutcome::Calibrated { k, .. } => Some(*k),
            CalibrationOutcome::Missed { .. } => None,
        }
    }

    pub fn result(&self) -> Option<&BacktestResult> {
        match self {
            CalibrationOutcome::Calibrated { result, .. } => Some(result),
            CalibrationOutcome::Missed { .. } => None,
        }
    }

    pub fn trace(&self) -> &[BacktestResult] {
        match self {
            CalibrationOutcome::Calibrated { trace, .. } => trace,
            CalibrationOutcome::Missed { trace } => trace,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self, CalibrationOutcome::Calibrated { .. })
    }
}
