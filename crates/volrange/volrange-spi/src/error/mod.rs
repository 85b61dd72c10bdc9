//! Error types for volatility range forecasting.

mod volrange_error;

pub use volrange_error::*;
