//! Backtest result schema
//!
//! Mirrors the JSON produced by the backtest-computation backend. All fields
//! that newer backend versions may omit are optional so older result files
//! keep deserializing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Option greeks exposure at one point in time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

/// A single executed trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    /// BUY, SELL or WITHDRAW
    #[serde(rename = "type")]
    pub kind: String,
    /// EQUITY, LEAP or CASH
    pub asset: String,
    pub quantity: f64,
    pub price: f64,
    pub value: f64,
    pub reason: String,
}

/// Daily portfolio snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub total_value: f64,
    #[serde(default)]
    pub drawdown: Option<f64>,
    #[serde(default)]
    pub benchmark_value: Option<f64>,
    #[serde(default)]
    pub greeks: Option<Greeks>,
}

/// Strategy parameters echoed back by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestParams {
    pub equity_symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
}

/// Full result of one backtest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub backtest_id: String,
    pub params: BacktestParams,
    pub total_return: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub trades: Vec<Trade>,
    pub history: Vec<HistoryPoint>,
    /// Terminal portfolio value per trial, present only for simulation runs
    #[serde(default)]
    pub final_portfolio_values: Option<Vec<f64>>,
    #[serde(default)]
    pub is_simulation: Option<bool>,
}

impl BacktestResult {
    /// True when the history carries a benchmark track worth plotting
    pub fn has_benchmark(&self) -> bool {
        self.history.iter().any(|h| h.benchmark_value.is_some())
    }
}
