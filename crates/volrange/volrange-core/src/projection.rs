//! Range projection.

use volrange_api::ProjectionConfig;
use volrange_spi::ForecastRange;

use crate::volatility::round2;

/// Unrounded `(low, high)` around `price`.
///
/// The deviation scales with the square root of the horizon, which treats
/// daily returns as independent.
pub fn range_bounds(price: f64, vol_pct: f64, horizon: usize, k: f64) -> (f64, f64) {
    let deviation = price * k * (vol_pct / 100.0) * (horizon as f64).sqrt();
    (price - deviation, price + deviation)
}

/// Project a symmetric range around `price`, bounds rounded to 2 decimals.
///
/// Returns `None` when either the price or the volatility is undefined.
pub fn project_range(price: Option<f64>, vol_pct: Option<f64>, horizon: usize, k: f64) -> Option<ForecastRange> {
    let (price, vol_pct) = (price?, vol_pct?);
    let (low, high) = range_bounds(price, vol_pct, horizon, k);
    Some(ForecastRange {
        reference: price,
        low: round2(low),
        high: round2(high),
        horizon,
        k,
    })
}

/// Range projector bound to a fixed horizon and scale factor.
#[derive(Debug, Clone, Default)]
pub struct RangeProjector {
    config: ProjectionConfig,
}

impl RangeProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn project(&self, price: Option<f64>, vol_pct: Option<f64>) -> Option<ForecastRange> {
        project_range(price, vol_pct, self.config.horizon, self.config.k)
    }
}
