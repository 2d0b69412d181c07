//! Data models for stratviz services
//!
//! This module organizes the backtest result schema received from the
//! computation backend and the chart-side structs derived from it.

pub mod backtest;
pub mod chart;

// Re-export commonly used types for convenience
pub use backtest::{BacktestParams, BacktestResult, Greeks, HistoryPoint, Trade};
pub use chart::{CrosshairSample, HistogramBin, PointerEvent, RangeLabel, TimePoint, VisibleRange};
