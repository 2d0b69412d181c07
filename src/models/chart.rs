//! Chart-side data structs derived from backtest history

use chrono::NaiveDate;

/// A single plotted point on a chart series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint {
    pub time: NaiveDate,
    pub value: f64,
}

/// Time bounds currently shown on the chart's x axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Zoom preset selectable on the rendered chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeLabel {
    OneMonth,
    SixMonths,
    OneYear,
    #[default]
    All,
}

impl RangeLabel {
    /// Window length in calendar months, `None` for the full-span preset
    pub fn months(self) -> Option<u32> {
        match self {
            RangeLabel::OneMonth => Some(1),
            RangeLabel::SixMonths => Some(6),
            RangeLabel::OneYear => Some(12),
            RangeLabel::All => None,
        }
    }
}

impl std::fmt::Display for RangeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RangeLabel::OneMonth => "1M",
            RangeLabel::SixMonths => "6M",
            RangeLabel::OneYear => "1Y",
            RangeLabel::All => "ALL",
        };
        write!(f, "{}", label)
    }
}

/// A pointer movement over the plot area
///
/// `time` is the data coordinate under the pointer, if the pointer maps to
/// one; `x`/`y` are pixel offsets from the plot's top-left corner.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub time: Option<NaiveDate>,
    pub x: f64,
    pub y: f64,
}

/// Value pair shown in the legend, recomputed on every pointer move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrosshairSample {
    pub date: NaiveDate,
    pub portfolio_value: Option<f64>,
    pub benchmark_value: Option<f64>,
}

/// One interval of the terminal-value histogram
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub label: String,
    pub count: usize,
    pub range_start: f64,
    pub range_end: f64,
}
