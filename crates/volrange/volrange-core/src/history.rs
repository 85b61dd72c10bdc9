//! Price history normalization and validation.

use tracing::{debug, info};
use volrange_spi::{HistoryIssue, PriceHistory, PricePoint, RawPriceRecord, Result, VolRangeError};

/// Default minimum row count for analysis.
pub const DEFAULT_MIN_ROWS: usize = 60;

/// Turn raw records into a valid [`PriceHistory`].
///
/// The adjusted close wins over the plain close. Records without a date or a
/// finite positive close are dropped, the rest are sorted by date and
/// duplicate dates keep their last record in input order.
///
/// Fails with `NoClose` when records exist but none carries a close.
pub fn normalize_records(records: Vec<RawPriceRecord>) -> Result<PriceHistory> {
    let total = records.len();
    if total > 0 && records.iter().all(|r| r.effective_close().is_none()) {
        return Err(VolRangeError::InvalidHistory(HistoryIssue::NoClose));
    }

    let mut points: Vec<PricePoint> = records
        .iter()
        .filter_map(|record| {
            let date = record.date?;
            let close = record.effective_close()?;
            (close.is_finite() && close > 0.0).then(|| PricePoint::new(date, close))
        })
        .collect();
    let unusable = total - points.len();

    // Stable sort keeps input order among equal dates.
    points.sort_by_key(|p| p.date);
    let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match deduped.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => deduped.push(point),
        }
    }
    let duplicates = total - unusable - deduped.len();

    if unusable > 0 || duplicates > 0 {
        debug!(unusable, duplicates, "dropped price records");
    }
    let history = PriceHistory::new(deduped)?;
    info!(
        rows = history.len(),
        first = ?history.first_date(),
        last = ?history.last_date(),
        "normalized price history"
    );
    Ok(history)
}

/// Check that a history is long enough to analyze.
pub fn validate_history(history: &PriceHistory, min_rows: usize) -> Result<()> {
    if history.is_empty() {
        return Err(VolRangeError::InvalidHistory(HistoryIssue::Empty));
    }
    if history.len() < min_rows {
        debug!(rows = history.len(), min_rows, "history too short");
        return Err(VolRangeError::InvalidHistory(HistoryIssue::TooShort));
    }
    Ok(())
}
