//! Descriptive indicator models.

use serde::{Deserialize, Serialize};

/// Moving-average crossover label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "uptrend")]
    Up,
    #[serde(rename = "downtrend")]
    Down,
    #[serde(rename = "sideways")]
    Sideways,
    #[serde(rename = "undefined trend")]
    Undefined,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "uptrend",
            Trend::Down => "downtrend",
            Trend::Sideways => "sideways",
            Trend::Undefined => "undefined trend",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk bucket derived from volatility and drawdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Undefined,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Undefined => "undefined",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator snapshot for one price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReport {
    pub trend: Trend,
    pub ma_fast: Option<f64>,
    pub ma_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub vol_std: Option<f64>,
    pub vol_ewma: Option<f64>,
    pub vol_robust: Option<f64>,
    /// EWMA volatility when defined, otherwise the standard-deviation estimate.
    pub volatility: Option<f64>,
    /// Maximum drawdown in percent.
    pub drawdown: Option<f64>,
    pub risk: RiskLevel,
}
