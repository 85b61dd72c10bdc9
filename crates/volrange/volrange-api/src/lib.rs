//! Volatility Range API
//!
//! **WARNING: This is an internal crate. Do not depend on it directly.**
//! **Use `volrange-facade` instead for a stable public API.**
//!
//! Configuration types and builders for estimators, projection, backtesting,
//! calibration, indicators and the combined analysis.

mod config;

pub use config::*;
