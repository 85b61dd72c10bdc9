//! Descriptive indicators: trend, RSI, drawdown and risk bucket.

use volrange_api::{EstimatorConfig, IndicatorConfig, RiskThresholds};
use volrange_spi::{IndicatorReport, RiskLevel, Trend};

use crate::volatility::{ewma_volatility, log_std_volatility, robust_volatility, round2};

/// Simple moving average of the trailing `period` values.
pub fn sma(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period {
        return None;
    }
    let sum: f64 = data[data.len() - period..].iter().sum();
    Some(sum / period as f64)
}

/// Moving-average crossover label.
pub fn detect_trend(data: &[f64], fast_period: usize, slow_period: usize) -> Trend {
    match (sma(data, fast_period), sma(data, slow_period)) {
        (Some(fast), Some(slow)) if fast > slow => Trend::Up,
        (Some(fast), Some(slow)) if fast < slow => Trend::Down,
        (Some(_), Some(_)) => Trend::Sideways,
        _ => Trend::Undefined,
    }
}

/// Relative strength index over the trailing `period` changes.
///
/// Zero changes count as gains. Returns exactly 100 when there are no losses.
pub fn rsi(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period + 1 {
        return None;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for w in data[data.len() - period - 1..].windows(2) {
        let change = w[1] - w[0];
        if change >= 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(round2(100.0 - 100.0 / (1.0 + rs)))
}

/// Largest peak-to-trough decline, in percent.
pub fn max_drawdown(data: &[f64]) -> Option<f64> {
    let first = *data.first()?;
    let mut peak = first;
    let mut max_dd: f64 = 0.0;
    for &price in data {
        if price > peak {
            peak = price;
        }
        if peak > 0.0 {
            max_dd = max_dd.max((peak - price) / peak);
        }
    }
    Some(round2(max_dd * 100.0))
}

/// Risk bucket from volatility and drawdown (both percent).
pub fn classify_risk(volatility: Option<f64>, drawdown: Option<f64>, thresholds: &RiskThresholds) -> RiskLevel {
    let (Some(vol), Some(dd)) = (volatility, drawdown) else {
        return RiskLevel::Undefined;
    };
    if vol < thresholds.low_volatility && dd < thresholds.low_drawdown {
        RiskLevel::Low
    } else if vol < thresholds.medium_volatility && dd < thresholds.medium_drawdown {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Full indicator snapshot for `closes`.
pub fn analyze_indicators(closes: &[f64], config: &IndicatorConfig, estimators: &EstimatorConfig) -> IndicatorReport {
    let vol_std = log_std_volatility(closes);
    let vol_ewma = ewma_volatility(closes, estimators.ewma_decay);
    let vol_robust = robust_volatility(closes, estimators.robust_clip_k, estimators.robust_min_samples);
    let volatility = vol_ewma.or(vol_std);
    let drawdown = max_drawdown(closes);

    IndicatorReport {
        trend: detect_trend(closes, config.fast_period, config.slow_period),
        ma_fast: sma(closes, config.fast_period),
        ma_slow: sma(closes, config.slow_period),
        rsi: rsi(closes, config.rsi_period),
        vol_std,
        vol_ewma,
        vol_robust,
        volatility,
        drawdown,
        risk: classify_risk(volatility, drawdown, &config.risk),
    }
}

/// Indicator aggregator bound to its windows and thresholds.
#[derive(Debug, Clone, Default)]
pub struct IndicatorAggregator {
    config: IndicatorConfig,
    estimators: EstimatorConfig,
}

impl IndicatorAggregator {
    pub fn new(config: IndicatorConfig) -> Self {
        Self {
            config,
            estimators: EstimatorConfig::default(),
        }
    }

    pub fn with_estimators(mut self, estimators: EstimatorConfig) -> Self {
        self.estimators = estimators;
        self
    }

    pub fn analyze(&self, closes: &[f64]) -> IndicatorReport {
        analyze_indicators(closes, &self.config, &self.estimators)
    }
}
