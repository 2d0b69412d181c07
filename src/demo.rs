//! Synthetic backtest result for `--demo` runs
//!
//! A geometric random walk standing in for the backend so the binary can be
//! exercised without a results file.

use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::models::{BacktestParams, BacktestResult, Greeks, HistoryPoint, Trade};

const TRADING_DAYS: u32 = 504;
const SIMULATION_TRIALS: usize = 300;

pub fn synthetic_result() -> BacktestResult {
    let mut rng = rand::thread_rng();
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let initial_capital = 100000.0;

    let mut portfolio = initial_capital;
    let mut benchmark = initial_capital;
    let mut peak = initial_capital;
    let mut delta = 95.0;
    let mut history = Vec::with_capacity(TRADING_DAYS as usize);

    for i in 0..TRADING_DAYS {
        portfolio *= 1.0 + daily_return(&mut rng, 0.0005, 0.012);
        benchmark *= 1.0 + daily_return(&mut rng, 0.0003, 0.010);
        peak = peak.max(portfolio);
        delta += daily_return(&mut rng, 0.0, 0.8);

        history.push(HistoryPoint {
            date: start + Duration::days(i as i64),
            total_value: portfolio,
            drawdown: Some((peak - portfolio) / peak),
            benchmark_value: Some(benchmark),
            greeks: Some(Greeks {
                delta,
                gamma: 0.08 + daily_return(&mut rng, 0.0, 0.01),
                theta: -4.5 + daily_return(&mut rng, 0.0, 0.4),
                vega: 22.0 + daily_return(&mut rng, 0.0, 1.5),
            }),
        });
    }

    let end_date = history.last().map(|h| h.date).unwrap_or(start);
    let total_return = (portfolio / initial_capital - 1.0) * 100.0;
    let years = TRADING_DAYS as f64 / 252.0;
    let cagr = ((portfolio / initial_capital).powf(1.0 / years) - 1.0) * 100.0;
    let max_drawdown = history
        .iter()
        .filter_map(|h| h.drawdown)
        .fold(0.0f64, f64::max)
        * 100.0;

    let final_portfolio_values: Vec<f64> = (0..SIMULATION_TRIALS)
        .map(|_| {
            let mut value = initial_capital;
            for _ in 0..TRADING_DAYS {
                value *= 1.0 + daily_return(&mut rng, 0.0005, 0.012);
            }
            value
        })
        .collect();

    BacktestResult {
        backtest_id: "demo".to_string(),
        params: BacktestParams {
            equity_symbol: "QQQ".to_string(),
            start_date: start,
            end_date,
            initial_capital,
        },
        total_return,
        cagr,
        max_drawdown,
        sharpe_ratio: 1.2,
        trades: vec![Trade {
            date: start,
            kind: "BUY".to_string(),
            asset: "EQUITY".to_string(),
            quantity: 60000.0 / 300.0,
            price: 300.0,
            value: 60000.0,
            reason: "Initial allocation".to_string(),
        }],
        history,
        final_portfolio_values: Some(final_portfolio_values),
        is_simulation: Some(true),
    }
}

fn daily_return(rng: &mut impl Rng, drift: f64, volatility: f64) -> f64 {
    // Sum of uniforms approximates a normal draw closely enough for demo data
    let z: f64 = (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0;
    drift + volatility * z
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_history_is_daily_and_ordered() {
        let result = synthetic_result();

        assert_eq!(result.history.len(), TRADING_DAYS as usize);
        assert!(result
            .history
            .windows(2)
            .all(|w| w[0].date < w[1].date));
        assert!(result.has_benchmark());
        assert!(result.history.iter().all(|h| h.greeks.is_some()));
        assert_eq!(
            result.final_portfolio_values.as_ref().map(Vec::len),
            Some(SIMULATION_TRIALS)
        );
    }
}
