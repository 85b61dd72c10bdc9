//! Price history model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{HistoryIssue, Result, VolRangeError};

/// A single daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// An unvalidated record as read from a data file or provider.
///
/// `adj_close` takes precedence over `close` when both are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPriceRecord {
    pub date: Option<NaiveDate>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
}

impl RawPriceRecord {
    pub fn new(date: Option<NaiveDate>, close: Option<f64>) -> Self {
        Self {
            date,
            close,
            adj_close: None,
        }
    }

    pub fn with_adj_close(mut self, adj_close: Option<f64>) -> Self {
        self.adj_close = adj_close;
        self
    }

    /// The close to use for analysis.
    pub fn effective_close(&self) -> Option<f64> {
        self.adj_close.or(self.close)
    }
}

/// Ordered daily closes with strictly increasing dates and positive finite prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceHistory {
    points: Vec<PricePoint>,
}

impl PriceHistory {
    /// Build a history, rejecting points that break the ordering or price invariants.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for point in &points {
            if !point.close.is_finite() {
                return Err(VolRangeError::InvalidHistory(HistoryIssue::CloseNotFinite));
            }
            if point.close <= 0.0 {
                return Err(VolRangeError::InvalidHistory(HistoryIssue::NonPositiveClose));
            }
        }
        for pair in points.windows(2) {
            if pair[1].date == pair[0].date {
                return Err(VolRangeError::InvalidHistory(HistoryIssue::DuplicateDate));
            }
            if pair[1].date < pair[0].date {
                return Err(VolRangeError::InvalidHistory(HistoryIssue::UnsortedDates));
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }
}

impl TryFrom<Vec<PricePoint>> for PriceHistory {
    type Error = VolRangeError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<PriceHistory> for Vec<PricePoint> {
    fn from(history: PriceHistory) -> Self {
        history.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_new_accepts_ordered_positive() {
        let history = PriceHistory::new(vec![
            PricePoint::new(day(1), 10.0),
            PricePoint::new(day(2), 10.5),
            PricePoint::new(day(5), 9.8),
        ])
        .unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history.closes(), vec![10.0, 10.5, 9.8]);
        assert_eq!(history.first_date(), Some(day(1)));
        assert_eq!(history.last_date(), Some(day(5)));
        assert_eq!(history.last_close(), Some(9.8));
    }

    #[test]
    fn test_new_rejects_duplicate_date() {
        let err = PriceHistory::new(vec![
            PricePoint::new(day(1), 10.0),
            PricePoint::new(day(1), 10.5),
        ])
        .unwrap_err();
        assert!(matches!(err, VolRangeError::InvalidHistory(HistoryIssue::DuplicateDate)));
    }

    #[test]
    fn test_new_rejects_unsorted() {
        let err = PriceHistory::new(vec![
            PricePoint::new(day(3), 10.0),
            PricePoint::new(day(2), 10.5),
        ])
        .unwrap_err();
        assert!(matches!(err, VolRangeError::InvalidHistory(HistoryIssue::UnsortedDates)));
    }

    #[test]
    fn test_new_rejects_bad_prices() {
        let err = PriceHistory::new(vec![PricePoint::new(day(1), 0.0)]).unwrap_err();
        assert!(matches!(err, VolRangeError::InvalidHistory(HistoryIssue::NonPositiveClose)));

        let err = PriceHistory::new(vec![PricePoint::new(day(1), f64::NAN)]).unwrap_err();
        assert!(matches!(err, VolRangeError::InvalidHistory(HistoryIssue::CloseNotFinite)));
    }

    #[test]
    fn test_empty_history() {
        let history = PriceHistory::default();
        assert!(history.is_empty());
        assert_eq!(history.last_close(), None);
    }

    #[test]
    fn test_effective_close_prefers_adjusted() {
        let record = RawPriceRecord::new(Some(day(1)), Some(10.0)).with_adj_close(Some(9.5));
        assert_eq!(record.effective_close(), Some(9.5));

        let record = RawPriceRecord::new(Some(day(1)), Some(10.0));
        assert_eq!(record.effective_close(), Some(10.0));
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"[{"date":"2024-01-02","close":10.0},{"date":"2024-01-01","close":11.0}]"#;
        let parsed: std::result::Result<PriceHistory, _> = serde_json::from_str(json);
        assert!(parsed.is_err());

        let json = r#"[{"date":"2024-01-01","close":10.0},{"date":"2024-01-02","close":11.0}]"#;
        let parsed: PriceHistory = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.len(), 2);
    }
}
