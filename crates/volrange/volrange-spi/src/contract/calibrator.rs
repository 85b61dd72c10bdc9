//! Calibrator trait.

use crate::model::CalibrationOutcome;

/// Scale-factor search over a backtester.
pub trait Calibrator: Send + Sync {
    /// Search for the smallest scale factor reaching the target coverage.
    fn calibrate(&self, closes: &[f64]) -> CalibrationOutcome;
}
