//! Forecast range model.

use serde::{Deserialize, Serialize};

/// Symmetric price interval projected around a reference price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRange {
    /// Price the range was projected from.
    pub reference: f64,
    pub low: f64,
    pub high: f64,
    /// Trading days ahead.
    pub horizon: usize,
    /// Scale factor applied to the volatility.
    pub k: f64,
}

impl ForecastRange {
    /// Distance between the bounds.
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Whether `price` falls inside the range (inclusive bounds).
    pub fn contains(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }
}
