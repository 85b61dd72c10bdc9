//! Volatility estimator trait.

use crate::model::Estimator;

/// Maps a price sequence to a daily volatility in percent.
///
/// Implementations never fail: too little data answers `None`.
pub trait VolatilityEstimator: Send + Sync {
    /// Which estimation method this is.
    fn kind(&self) -> Estimator;

    /// Minimum number of log-returns needed for a defined estimate.
    fn min_returns(&self) -> usize;

    /// Estimate daily volatility (percent, 2 decimals) from ordered prices.
    fn estimate(&self, prices: &[f64]) -> Option<f64>;

    /// Estimator name.
    fn name(&self) -> &str {
        self.kind().as_str()
    }
}
