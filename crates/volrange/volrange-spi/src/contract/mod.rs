//! Trait contracts for volatility range forecasting.

mod backtester;
mod calibrator;
mod volatility_estimator;

pub use backtester::*;
pub use calibrator::*;
pub use volatility_estimator::*;
