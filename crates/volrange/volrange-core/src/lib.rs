//! Volatility Range Core
//!
//! **WARNING: This is an internal crate. Do not depend on it directly.**
//! **Use `volrange-facade` instead for a stable public API.**
//!
//! Implementations for volatility estimation, range projection, walk-forward
//! backtesting, scale-factor calibration, indicators and the combined analysis.

pub mod analysis;
pub mod backtesting;
pub mod calibration;
pub mod history;
pub mod indicators;
pub mod projection;
pub mod volatility;

pub use analysis::*;
pub use backtesting::*;
pub use calibration::*;
pub use history::*;
pub use indicators::*;
pub use projection::*;
pub use volatility::*;
