//! Data models for volatility range forecasting.

mod backtest;
mod calibration;
mod estimator;
mod forecast;
mod history;
mod indicator;

pub use backtest::*;
pub use calibration::*;
pub use estimator::*;
pub use forecast::*;
pub use history::*;
pub use indicator::*;
