//! Volatility estimator selection.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::VolRangeError;

/// Volatility estimation method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Estimator {
    /// Sample standard deviation of log-returns.
    Std,
    /// Exponentially weighted variance of log-returns.
    #[default]
    Ewma,
    /// MAD-based winsorized standard deviation.
    #[serde(alias = "rob")]
    Robust,
}

impl Estimator {
    /// All estimators, in reporting order.
    pub const ALL: [Estimator; 3] = [Estimator::Std, Estimator::Ewma, Estimator::Robust];

    /// Short name used as a key in reports and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Estimator::Std => "std",
            Estimator::Ewma => "ewma",
            Estimator::Robust => "robust",
        }
    }
}

impl std::fmt::Display for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Estimator {
    type Err = VolRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "std" | "stdev" | "log_std" => Ok(Estimator::Std),
            "ewma" => Ok(Estimator::Ewma),
            "robust" | "rob" | "mad" => Ok(Estimator::Robust),
            other => Err(VolRangeError::invalid_parameter(
                "estimator",
                format!("unknown estimator '{}', expected std, ewma or robust", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ewma() {
        assert_eq!(Estimator::default(), Estimator::Ewma);
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("std".parse::<Estimator>().unwrap(), Estimator::Std);
        assert_eq!("EWMA".parse::<Estimator>().unwrap(), Estimator::Ewma);
        assert_eq!("rob".parse::<Estimator>().unwrap(), Estimator::Robust);
        assert_eq!(" robust ".parse::<Estimator>().unwrap(), Estimator::Robust);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "garch".parse::<Estimator>().unwrap_err();
        assert!(err.to_string().contains("garch"));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for estimator in Estimator::ALL {
            assert_eq!(estimator.to_string().parse::<Estimator>().unwrap(), estimator);
        }
    }

    #[test]
    fn test_serde_lowercase_and_alias() {
        assert_eq!(serde_json::to_string(&Estimator::Robust).unwrap(), "\"robust\"");
        let parsed: Estimator = serde_json::from_str("\"rob\"").unwrap();
        assert_eq!(parsed, Estimator::Robust);
    }
}
