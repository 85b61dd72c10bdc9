//! Basic example demonstrating volatility range forecasting
//!
//! Run with: cargo run --example basic -p volrange-facade

use volrange::{
    backtest_range, calibrate_k, ewma_volatility, log_std_volatility, project_range, robust_volatility,
    BacktestConfig, CalibrationConfig, CalibrationOutcome, Estimator, EstimatorConfig,
};

fn main() {
    println!("=== volrange Basic Examples ===\n");

    // Synthetic daily closes: drift plus two overlapping cycles
    let closes: Vec<f64> = (0..300)
        .map(|i| {
            let t = i as f64;
            100.0 + t * 0.03 + (t * 0.25).sin() * 3.0 + (t * 1.1).cos() * 1.2
        })
        .collect();
    let last = closes[closes.len() - 1];
    println!("Sample closes: {:.2?} ... last {:.2}\n", &closes[..5], last);

    // 1. Volatility estimators
    let vol_std = log_std_volatility(&closes);
    let vol_ewma = ewma_volatility(&closes, 0.94);
    let vol_robust = robust_volatility(&closes, 3.0, 10);
    println!("1. Daily volatility (%)");
    println!("   std:    {:?}", vol_std);
    println!("   ewma:   {:?}", vol_ewma);
    println!("   robust: {:?}", vol_robust);

    // 2. Range projection over 10 trading days
    if let Some(range) = project_range(Some(last), vol_ewma, 10, 1.0) {
        println!("\n2. 10-day range at k=1.0: [{:.2}, {:.2}]", range.low, range.high);
    }

    // 3. Walk-forward backtest per estimator
    println!("\n3. Walk-forward backtest (horizon 10, k 1.0)");
    let estimators = EstimatorConfig::default();
    for estimator in Estimator::ALL {
        let config = BacktestConfig::default().with_estimator(estimator);
        match backtest_range(&closes, &config, &estimators) {
            Some(result) => println!(
                "   {:<7} trials {:>3}  coverage {:>6.2}%  mean width {:.2}",
                estimator, result.trials, result.coverage, result.mean_width
            ),
            None => println!("   {:<7} no eligible trials", estimator),
        }
    }

    // 4. Calibrate k for 80% coverage
    println!("\n4. Calibration (target 80%)");
    let config = CalibrationConfig::default();
    match calibrate_k(&closes, &config, &estimators) {
        CalibrationOutcome::Calibrated { k, result, trace } => {
            println!("   k = {:.3} after {} candidates, coverage {:.2}%", k, trace.len(), result.coverage);
            if let Some(range) = project_range(Some(last), vol_ewma, 10, k) {
                println!("   calibrated range: [{:.2}, {:.2}]", range.low, range.high);
            }
        }
        CalibrationOutcome::Missed { trace } => {
            println!("   no k in [{}, {}] reached the target ({} evaluated)", config.k_min, config.k_max, trace.len());
        }
    }

    println!("\n=== Examples Complete ===");
}
