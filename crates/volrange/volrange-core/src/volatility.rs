//! Volatility estimators.
//!
//! Every estimator maps a price sequence to a daily volatility in percent
//! (standard deviation of log-returns × 100, rounded to 2 decimals), or
//! `None` when there are not enough usable returns.

use volrange_api::EstimatorConfig;
use volrange_spi::{Estimator, VolatilityEstimator};

/// Scale from MAD to a normal-consistent sigma.
pub const MAD_SCALE: f64 = 1.4826;

/// Round half away from zero to 2 decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round half away from zero to 3 decimals.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Log-returns of consecutive prices.
///
/// Pairs where either price is non-positive or non-finite are skipped.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| is_valid_price(w[0]) && is_valid_price(w[1]))
        .map(|w| (w[1] / w[0]).ln())
        .collect()
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample standard deviation; `None` below 2 values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

fn population_variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation of log-returns, in percent.
pub fn log_std_volatility(prices: &[f64]) -> Option<f64> {
    let returns = log_returns(prices);
    sample_std(&returns).map(|s| round2(s * 100.0))
}

/// Exponentially weighted volatility, in percent.
///
/// The variance is seeded with the population variance of all returns and
/// then updated with every return after the first.
pub fn ewma_volatility(prices: &[f64], decay: f64) -> Option<f64> {
    let returns = log_returns(prices);
    if returns.len() < 2 {
        return None;
    }
    let mut variance = population_variance(&returns);
    for r in &returns[1..] {
        variance = decay * variance + (1.0 - decay) * r * r;
    }
    Some(round2(variance.max(0.0).sqrt() * 100.0))
}

/// Outlier-robust volatility, in percent.
///
/// Returns are winsorized to `median ± clip_k · 1.4826 · MAD` before taking
/// the sample standard deviation. A zero MAD falls back to the plain sample
/// standard deviation.
pub fn robust_volatility(prices: &[f64], clip_k: f64, min_samples: usize) -> Option<f64> {
    let returns = log_returns(prices);
    if returns.len() < min_samples.max(2) {
        return None;
    }

    let med = median(&returns);
    let deviations: Vec<f64> = returns.iter().map(|r| (r - med).abs()).collect();
    let sigma = MAD_SCALE * median(&deviations);

    if !(sigma.is_finite() && sigma > 0.0) {
        return sample_std(&returns).map(|s| round2(s * 100.0));
    }

    let lower = med - clip_k * sigma;
    let upper = med + clip_k * sigma;
    let clipped: Vec<f64> = returns.iter().map(|r| r.max(lower).min(upper)).collect();
    sample_std(&clipped).map(|s| round2(s * 100.0))
}

// ============================================================================
// Estimator implementations
// ============================================================================

/// Log-return standard deviation estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStdEstimator;

impl LogStdEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl VolatilityEstimator for LogStdEstimator {
    fn kind(&self) -> Estimator {
        Estimator::Std
    }

    fn min_returns(&self) -> usize {
        2
    }

    fn estimate(&self, prices: &[f64]) -> Option<f64> {
        log_std_volatility(prices)
    }
}

/// EWMA estimator.
#[derive(Debug, Clone, Copy)]
pub struct EwmaEstimator {
    decay: f64,
}

impl EwmaEstimator {
    pub fn new(decay: f64) -> Self {
        Self { decay }
    }
}

impl Default for EwmaEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default().ewma_decay)
    }
}

impl VolatilityEstimator for EwmaEstimator {
    fn kind(&self) -> Estimator {
        Estimator::Ewma
    }

    fn min_returns(&self) -> usize {
        2
    }

    fn estimate(&self, prices: &[f64]) -> Option<f64> {
        ewma_volatility(prices, self.decay)
    }
}

/// Winsorized MAD estimator.
#[derive(Debug, Clone, Copy)]
pub struct RobustEstimator {
    clip_k: f64,
    min_samples: usize,
}

impl RobustEstimator {
    pub fn new(clip_k: f64, min_samples: usize) -> Self {
        Self { clip_k, min_samples }
    }
}

impl Default for RobustEstimator {
    fn default() -> Self {
        let config = EstimatorConfig::default();
        Self::new(config.robust_clip_k, config.robust_min_samples)
    }
}

impl VolatilityEstimator for RobustEstimator {
    fn kind(&self) -> Estimator {
        Estimator::Robust
    }

    fn min_returns(&self) -> usize {
        self.min_samples.max(2)
    }

    fn estimate(&self, prices: &[f64]) -> Option<f64> {
        robust_volatility(prices, self.clip_k, self.min_samples)
    }
}

/// Create an estimator by kind.
pub fn create_estimator(kind: Estimator, config: &EstimatorConfig) -> Box<dyn VolatilityEstimator> {
    match kind {
        Estimator::Std => Box::new(LogStdEstimator::new()),
        Estimator::Ewma => Box::new(EwmaEstimator::new(config.ewma_decay)),
        Estimator::Robust => Box::new(RobustEstimator::new(config.robust_clip_k, config.robust_min_samples)),
    }
}

/// Volatility from the estimator of the given kind.
pub fn estimate_volatility(kind: Estimator, prices: &[f64], config: &EstimatorConfig) -> Option<f64> {
    match kind {
        Estimator::Std => log_std_volatility(prices),
        Estimator::Ewma => ewma_volatility(prices, config.ewma_decay),
        Estimator::Robust => robust_volatility(prices, config.robust_clip_k, config.robust_min_samples),
    }
}
