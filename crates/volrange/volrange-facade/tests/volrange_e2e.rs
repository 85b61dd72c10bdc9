//! End-to-end tests for volrange
//!
//! Tests the complete workflow from raw price records to the analysis report
//! using only this crate's API.

use chrono::NaiveDate;
use volrange::{
    analyze, normalize_records, validate_history, AnalysisConfig, CalibrationOutcome, Estimator, HistoryIssue,
    RawPriceRecord, VolRangeError,
};

fn raw_records(len: usize) -> Vec<RawPriceRecord> {
    let start = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
    let mut price: f64 = 30.0;
    (0..len)
        .map(|i| {
            let step = ((i * 7919) % 101) as f64 / 101.0 - 0.5;
            price *= 1.0 + step * 0.03;
            let date = start + chrono::Days::new(i as u64);
            RawPriceRecord::new(Some(date), Some(price))
        })
        .collect()
}

#[test]
fn e2e_records_to_report() {
    let mut records = raw_records(300);
    // Shuffle in a duplicate and an unusable row.
    records.push(RawPriceRecord::new(records[10].date, Some(31.5)));
    records.insert(0, RawPriceRecord::new(None, Some(12.0)));

    let history = normalize_records(records).unwrap();
    assert_eq!(history.len(), 300);
    validate_history(&history, 60).unwrap();

    let report = analyze(&history, None, &AnalysisConfig::default());
    assert_eq!(report.rows, 300);
    assert_eq!(report.reference_price, history.last_close());
    assert_eq!(history.points()[10].close, 31.5);

    for name in ["std", "ewma", "robust"] {
        let bt = report.backtests[name].as_ref().unwrap();
        assert_eq!(bt.horizon, 10);
        assert_eq!(bt.k, 1.0);
        assert_eq!(bt.estimator.as_str(), name);
        assert_eq!(bt.trials, 300 - 60 - 10);
    }

    let default = report.forecasts.default.unwrap();
    assert!(default.low <= default.reference && default.reference <= default.high);
}

#[test]
fn e2e_calibrated_forecast_is_consistent() {
    let history = normalize_records(raw_records(400)).unwrap();
    let config = AnalysisConfig::default().with_target_coverage(0.75);
    let report = analyze(&history, Some(33.0), &config);

    match report.calibration.as_ref().unwrap() {
        CalibrationOutcome::Calibrated { k, result, .. } => {
            assert!(result.coverage >= 75.0);
            let calibrated = report.forecasts.calibrated.unwrap();
            assert_eq!(calibrated.k, *k);
            assert_eq!(calibrated.reference, 33.0);
            assert_eq!(calibrated.horizon, 10);
        }
        CalibrationOutcome::Missed { trace } => {
            assert!(report.forecasts.calibrated.is_none());
            assert!(trace.iter().all(|r| r.coverage < 75.0));
        }
    }
}

#[test]
fn e2e_estimator_choice_drives_calibration() {
    let history = normalize_records(raw_records(250)).unwrap();
    for estimator in Estimator::ALL {
        let config = AnalysisConfig::default().with_estimator(estimator);
        let report = analyze(&history, None, &config);
        for result in report.calibration.unwrap().trace() {
            assert_eq!(result.estimator, estimator);
        }
    }
}

#[test]
fn e2e_short_history_rejected() {
    let history = normalize_records(raw_records(30)).unwrap();
    let err = validate_history(&history, 60).unwrap_err();
    assert!(matches!(err, VolRangeError::InvalidHistory(HistoryIssue::TooShort)));
    assert_eq!(err.to_string(), "Invalid price history: HISTORY_TOO_SHORT");
}

#[test]
fn e2e_report_serializes() {
    let history = normalize_records(raw_records(200)).unwrap();
    let config = AnalysisConfig::from_json_str(r#"{"horizon": 5, "estimator": "rob"}"#).unwrap();
    let report = analyze(&history, None, &config);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["horizon"], 5);
    assert_eq!(json["rows"], 200);
    assert!(json["backtests"]["robust"].is_object());
    assert!(json["forecasts"]["by_estimator"]["std"].is_object());
    assert!(json["indicators"]["trend"].is_string());
    let status = json["calibration"]["status"].as_str().unwrap();
    assert!(status == "calibrated" || status == "missed");
}
