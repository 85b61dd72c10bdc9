//! Volatility Range Facade
//!
//! Unified re-exports for the volatility range engine.
//!
//! This facade provides access to all components:
//! - `volatility` - Estimators (log-return std, EWMA, robust MAD)
//! - `projection` - Symmetric range projection
//! - `backtesting` - Walk-forward backtest (WalkForwardPlan, WalkForwardBacktester)
//! - `calibration` - Scale-factor scan (calibrate_k, ScanCalibrator)
//! - `indicators` - Trend, RSI, drawdown and risk bucket
//! - `history` - Price history normalization and validation
//! - `analysis` - Combined report for one history

// Re-export everything from SPI (traits, errors, types)
pub use volrange_spi::*;

// Re-export everything from API (configs)
pub use volrange_api::*;

// Re-export everything from Core (implementations)
pub use volrange_core::*;
