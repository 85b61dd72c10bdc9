//! Volatility range error types.
//!
//! Missing data is not an error in this domain: estimators, the backtester and
//! the indicators answer `None`. These variants cover the boundaries only
//! (price history construction and configuration).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason a price history was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryIssue {
    Empty,
    NoClose,
    CloseNotFinite,
    NonPositiveClose,
    UnsortedDates,
    DuplicateDate,
    TooShort,
}

impl HistoryIssue {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            HistoryIssue::Empty => "HISTORY_EMPTY",
            HistoryIssue::NoClose => "HISTORY_NO_CLOSE",
            HistoryIssue::CloseNotFinite => "CLOSE_NOT_FINITE",
            HistoryIssue::NonPositiveClose => "NON_POSITIVE_CLOSE",
            HistoryIssue::UnsortedDates => "UNSORTED_DATES",
            HistoryIssue::DuplicateDate => "DUPLICATE_DATE",
            HistoryIssue::TooShort => "HISTORY_TOO_SHORT",
        }
    }
}

impl std::fmt::Display for HistoryIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Volatility range errors.
#[derive(Debug, Error)]
pub enum VolRangeError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid price history: {0}")]
    InvalidHistory(HistoryIssue),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VolRangeError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        VolRangeError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for volatility range operations.
pub type Result<T> = std::result::Result<T, VolRangeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_display() {
        let error = VolRangeError::invalid_parameter("k_step", "must be positive");
        assert_eq!(error.to_string(), "Invalid parameter: k_step - must be positive");
    }

    #[test]
    fn test_invalid_history_uses_code() {
        let error = VolRangeError::InvalidHistory(HistoryIssue::TooShort);
        assert_eq!(error.to_string(), "Invalid price history: HISTORY_TOO_SHORT");
    }

    #[test]
    fn test_config_display() {
        let error = VolRangeError::Config("expected value at line 1".to_string());
        assert_eq!(error.to_string(), "Configuration error: expected value at line 1");
    }

    #[test]
    fn test_history_issue_codes_unique() {
        let issues = [
            HistoryIssue::Empty,
            HistoryIssue::NoClose,
            HistoryIssue::CloseNotFinite,
            HistoryIssue::NonPositiveClose,
            HistoryIssue::UnsortedDates,
            HistoryIssue::DuplicateDate,
            HistoryIssue::TooShort,
        ];
        let mut codes: Vec<&str> = issues.iter().map(|i| i.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), issues.len());
    }

    #[test]
    fn test_history_issue_serialize() {
        let json = serde_json::to_string(&HistoryIssue::DuplicateDate).unwrap();
        assert_eq!(json, "\"DUPLICATE_DATE\"");
    }

    #[test]
    fn test_short_history_is_a_history_issue() {
        let error = VolRangeError::InvalidHistory(HistoryIssue::TooShort);
        assert!(matches!(error, VolRangeError::InvalidHistory(HistoryIssue::TooShort)));
        assert_eq!(HistoryIssue::TooShort.code(), "HISTORY_TOO_SHORT");
    }

    #[test]
    fn test_error_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&VolRangeError::InvalidHistory(HistoryIssue::Empty));
    }
}
