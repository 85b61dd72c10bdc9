//! Scale-factor calibration.
//!
//! Scans `k` upward over `[k_min, k_max]` and stops at the first factor whose
//! walk-forward coverage reaches the target.

use rayon::prelude::*;
use tracing::{debug, warn};
use volrange_api::{CalibrationConfig, EstimatorConfig, MAX_K_CANDIDATES};
use volrange_spi::{BacktestResult, CalibrationOutcome, Calibrator};

use crate::backtesting::WalkForwardPlan;
use crate::volatility::round3;

/// Tolerance when comparing a rounded candidate with `k_max`.
const K_TOLERANCE: f64 = 1e-9;

/// Candidate factors `round3(k_min + i * step)` up to `k_max`, ascending.
///
/// Empty when the step is not positive, `k_max < k_min`, or the scan would
/// take more than `MAX_K_CANDIDATES` steps.
pub fn candidate_ks(k_min: f64, k_max: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0 && step.is_finite() && k_min.is_finite() && k_max.is_finite()) || k_max < k_min {
        return Vec::new();
    }
    if (k_max - k_min) / step >= MAX_K_CANDIDATES as f64 {
        return Vec::new();
    }

    let mut candidates: Vec<f64> = Vec::new();
    let mut i = 0usize;
    loop {
        let k = round3(k_min + i as f64 * step);
        if k > k_max + K_TOLERANCE {
            break;
        }
        // Steps finer than the rounding produce repeats.
        if candidates.last() != Some(&k) {
            candidates.push(k);
        }
        i += 1;
    }
    candidates
}

/// Calibrate the scale factor for `closes`.
pub fn calibrate_k(closes: &[f64], config: &CalibrationConfig, estimators: &EstimatorConfig) -> CalibrationOutcome {
    let candidates = candidate_ks(config.k_min, config.k_max, config.k_step);
    if candidates.is_empty() {
        warn!(
            k_min = config.k_min,
            k_max = config.k_max,
            k_step = config.k_step,
            "calibration scan has no candidates"
        );
        return CalibrationOutcome::Missed { trace: Vec::new() };
    }

    let plan = WalkForwardPlan::from_config(closes, &config.backtest_config(config.k_min), estimators);
    if config.parallel {
        parallel_sweep(&plan, &candidates, config.target_coverage)
    } else {
        sequential_scan(&plan, &candidates, config.target_coverage)
    }
}

fn sequential_scan(plan: &WalkForwardPlan, candidates: &[f64], target: f64) -> CalibrationOutcome {
    let mut trace = Vec::new();
    for &k in candidates {
        if let Some(outcome) = record(&mut trace, k, plan.score(k), target) {
            return outcome;
        }
    }
    missed(plan, trace, target)
}

/// Score every candidate concurrently, then replay the results in scan order
/// so the outcome matches the sequential scan.
fn parallel_sweep(plan: &WalkForwardPlan, candidates: &[f64], target: f64) -> CalibrationOutcome {
    let scored: Vec<Option<BacktestResult>> = candidates.par_iter().map(|&k| plan.score(k)).collect();

    let mut trace = Vec::new();
    for (&k, result) in candidates.iter().zip(scored) {
        if let Some(outcome) = record(&mut trace, k, result, target) {
            return outcome;
        }
    }
    missed(plan, trace, target)
}

/// Append `result` to the trace; returns the outcome once the target is met.
fn record(
    trace: &mut Vec<BacktestResult>,
    k: f64,
    result: Option<BacktestResult>,
    target: f64,
) -> Option<CalibrationOutcome> {
    let Some(result) = result else {
        debug!(k, "candidate skipped, no eligible trials");
        return None;
    };
    debug!(k, coverage = result.coverage, trials = result.trials, "calibration candidate");

    let reached = result.meets(target);
    trace.push(result.clone());
    if reached {
        debug!(k, coverage = result.coverage, "calibration target reached");
        Some(CalibrationOutcome::Calibrated { k, result, trace: std::mem::take(trace) })
    } else {
        None
    }
}

fn missed(plan: &WalkForwardPlan, trace: Vec<BacktestResult>, target: f64) -> CalibrationOutcome {
    if trace.is_empty() {
        warn!(estimator = %plan.estimator(), "calibration scan produced no backtest results");
    } else {
        debug!(target_coverage = target, evaluated = trace.len(), "no scale factor reached the target coverage");
    }
    CalibrationOutcome::Missed { trace }
}

/// Calibrator bound to a scan configuration.
#[derive(Debug, Clone, Default)]
pub struct ScanCalibrator {
    config: CalibrationConfig,
    estimators: EstimatorConfig,
}

impl ScanCalibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            estimators: EstimatorConfig::default(),
        }
    }

    pub fn with_estimators(mut self, estimators: EstimatorConfig) -> Self {
        self.estimators = estimators;
        self
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }
}

impl Calibrator for ScanCalibrator {
    fn calibrate(&self, closes: &[f64]) -> CalibrationOutcome {
        calibrate_k(closes, &self.config, &self.estimators)
    }
}
