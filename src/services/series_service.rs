//! Conversion from backtest history to chart series

use crate::models::{HistoryPoint, TimePoint};

/// Which history field a series is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesField {
    TotalValue,
    BenchmarkValue,
}

/// Map history snapshots to plotted points, preserving order.
///
/// For `TotalValue` the output has one point per input element. For
/// `BenchmarkValue` snapshots without a benchmark track are skipped, so an
/// all-`None` history yields an empty series and no benchmark trace gets
/// plotted.
pub fn to_series(history: &[HistoryPoint], field: SeriesField) -> Vec<TimePoint> {
    history
        .iter()
        .filter_map(|h| {
            let value = match field {
                SeriesField::TotalValue => Some(h.total_value),
                SeriesField::BenchmarkValue => h.benchmark_value,
            };
            value.map(|value| TimePoint {
                time: h.date,
                value,
            })
        })
        .collect()
}
