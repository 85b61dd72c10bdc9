//! Full analysis of one price history.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use volrange_api::AnalysisConfig;
use volrange_spi::{BacktestResult, CalibrationOutcome, Estimator, ForecastRange, IndicatorReport, PriceHistory};

use crate::backtesting::backtest_range;
use crate::calibration::calibrate_k;
use crate::indicators::analyze_indicators;
use crate::projection::project_range;

/// Projected ranges at the configured horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecasts {
    /// From the default volatility at `k = 1`.
    pub default: Option<ForecastRange>,
    /// One range per estimator at `k = 1`, keyed by estimator name.
    pub by_estimator: BTreeMap<String, Option<ForecastRange>>,
    /// From the default volatility at the calibrated `k`.
    pub calibrated: Option<ForecastRange>,
}

/// Everything the presentation layer renders for one history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Price the forecasts are projected from.
    pub reference_price: Option<f64>,
    pub horizon: usize,
    pub indicators: IndicatorReport,
    /// Backtests at `k = 1`, keyed by estimator name.
    pub backtests: BTreeMap<String, Option<BacktestResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationOutcome>,
    pub forecasts: Forecasts,
}

/// Run indicators, backtests, calibration and projections on `history`.
///
/// `reference_price` defaults to the last close.
pub fn analyze(history: &PriceHistory, reference_price: Option<f64>, config: &AnalysisConfig) -> AnalysisReport {
    let closes = history.closes();
    let reference_price = reference_price.or_else(|| history.last_close());
    let horizon = config.horizon;

    let indicators = analyze_indicators(&closes, &config.indicators, &config.estimators);

    let backtests: BTreeMap<String, Option<BacktestResult>> = Estimator::ALL
        .iter()
        .map(|&estimator| {
            let bt = config.backtest_config(estimator, 1.0);
            (estimator.to_string(), backtest_range(&closes, &bt, &config.estimators))
        })
        .collect();

    let calibration = config
        .calibrate
        .then(|| calibrate_k(&closes, &config.calibration_config(), &config.estimators));

    let by_estimator = Estimator::ALL
        .iter()
        .map(|&estimator| {
            let vol = match estimator {
                Estimator::Std => indicators.vol_std,
                Estimator::Ewma => indicators.vol_ewma,
                Estimator::Robust => indicators.vol_robust,
            };
            (estimator.to_string(), project_range(reference_price, vol, horizon, 1.0))
        })
        .collect();

    let calibrated = calibration
        .as_ref()
        .and_then(CalibrationOutcome::k)
        .and_then(|k| project_range(reference_price, indicators.volatility, horizon, k));

    let forecasts = Forecasts {
        default: project_range(reference_price, indicators.volatility, horizon, 1.0),
        by_estimator,
        calibrated,
    };

    info!(
        rows = history.len(),
        horizon,
        calibrated_k = ?calibration.as_ref().and_then(CalibrationOutcome::k),
        "analysis complete"
    );

    AnalysisReport {
        rows: history.len(),
        first_date: history.first_date(),
        last_date: history.last_date(),
        reference_price,
        horizon,
        indicators,
        backtests,
        calibration,
        forecasts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volrange_spi::PricePoint;

    fn history(closes: &[f64]) -> PriceHistory {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + chrono::Days::new(i as u64), c))
            .collect();
        PriceHistory::new(points).unwrap()
    }

    fn wave(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + (i as f64 * 1.7).cos() * 1.5)
            .collect()
    }

    #[test]
    fn test_report_shape() {
        let h = history(&wave(250));
        let report = analyze(&h, None, &AnalysisConfig::default());

        assert_eq!(report.rows, 250);
        assert_eq!(report.reference_price, h.last_close());
        assert_eq!(report.horizon, 10);
        assert_eq!(
            report.backtests.keys().cloned().collect::<Vec<_>>(),
            vec!["ewma".to_string(), "robust".to_string(), "std".to_string()]
        );
        assert!(report.backtests.values().all(|bt| bt.is_some()));
        assert!(report.calibration.is_some());
        assert_eq!(report.forecasts.by_estimator.len(), 3);
        assert!(report.forecasts.default.is_some());
        assert_eq!(report.forecasts.by_estimator["ewma"], report.forecasts.default);
    }

    #[test]
    fn test_calibrated_range_uses_calibrated_k() {
        let h = history(&wave(250));
        let report = analyze(&h, Some(120.0), &AnalysisConfig::default());
        let outcome = report.calibration.as_ref().unwrap();
        match (outcome.k(), report.forecasts.calibrated) {
            (Some(k), Some(range)) => {
                assert_eq!(range.k, k);
                assert_eq!(range.reference, 120.0);
            }
            (None, None) => {}
            other => panic!("calibrated range inconsistent with outcome: {other:?}"),
        }
    }

    #[test]
    fn test_calibration_can_be_disabled() {
        let h = history(&wave(120));
        let config = AnalysisConfig::default().with_calibration(false);
        let report = analyze(&h, None, &config);
        assert!(report.calibration.is_none());
        assert!(report.forecasts.calibrated.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("calibration").is_none());
    }

    #[test]
    fn test_short_history_degrades_to_none() {
        let h = history(&[100.0, 101.0]);
        let report = analyze(&h, None, &AnalysisConfig::default());
        assert!(report.backtests.values().all(|bt| bt.is_none()));
        assert_eq!(report.calibration, Some(CalibrationOutcome::Missed { trace: vec![] }));
        assert!(report.forecasts.default.is_none());
        assert!(report.forecasts.calibrated.is_none());
    }
}
