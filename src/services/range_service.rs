//! Time-range zoom presets
//!
//! Maps a user-chosen label to a concrete time window over the loaded series.
//! Bounded windows are anchored at the last data point and reach back whole
//! calendar months, so month-end anchors clamp per calendar rules
//! (2023-03-31 minus one month is 2023-02-28).

use chrono::Months;

use crate::models::{RangeLabel, TimePoint, VisibleRange};

/// Parse a zoom label. Supported: 1M, 6M, 1Y, ALL (case-insensitive).
pub fn parse_range_label(label: &str) -> Result<RangeLabel, String> {
    match label.to_uppercase().as_str() {
        "1M" => Ok(RangeLabel::OneMonth),
        "6M" => Ok(RangeLabel::SixMonths),
        "1Y" => Ok(RangeLabel::OneYear),
        "ALL" => Ok(RangeLabel::All),
        _ => Err(format!(
            "Unknown range label: '{}'. Supported: 1M, 6M, 1Y, ALL",
            label
        )),
    }
}

/// Compute the visible window for a bounded label.
///
/// Returns `None` for `ALL` (the chart fits to full content instead of
/// setting explicit bounds) and for an empty series.
pub fn select_range(label: RangeLabel, series: &[TimePoint]) -> Option<VisibleRange> {
    let end = series.last()?.time;
    let months = label.months()?;
    let start = end.checked_sub_months(Months::new(months))?;

    Some(VisibleRange {
        from: start,
        to: end,
    })
}
