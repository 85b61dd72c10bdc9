//! Volatility Range Service Provider Interface
//!
//! Defines traits and types for volatility estimation, forecast ranges,
//! walk-forward backtesting and scale-factor calibration.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::*;
pub use error::*;
pub use model::*;
