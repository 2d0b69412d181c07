//! Crosshair-driven legend
//!
//! The legend tracks pointer movement over the plot area and shows the value
//! pair nearest the pointer. Outside the plot (or before any pointer event)
//! it falls back to the latest data point, so it is never blank.

use crate::models::{CrosshairSample, PointerEvent, TimePoint};
use crate::services::chart_service::CHART_HEIGHT;
use crate::utils::format::{format_currency, format_date};

/// Vertical extent of the plot area in pixels; pointer events below or above
/// this band are treated as outside.
pub const PLOT_HEIGHT: f64 = CHART_HEIGHT as f64;

/// Legend state for one active chart lifecycle
#[derive(Debug)]
pub struct CrosshairLegend {
    symbol: String,
    current: Option<CrosshairSample>,
}

impl CrosshairLegend {
    /// Create the legend with its initial fallback sample
    pub fn new(symbol: &str, initial: Option<CrosshairSample>) -> Self {
        CrosshairLegend {
            symbol: symbol.to_string(),
            current: initial,
        }
    }

    /// Record the sample produced by the latest pointer event
    pub fn on_sample(&mut self, sample: &CrosshairSample) {
        self.current = Some(*sample);
    }

    pub fn current(&self) -> Option<&CrosshairSample> {
        self.current.as_ref()
    }

    /// Render the legend text, one line per entry.
    ///
    /// The benchmark line is omitted entirely when the sample has no
    /// benchmark value.
    pub fn lines(&self) -> Vec<String> {
        let Some(sample) = &self.current else {
            return Vec::new();
        };

        let mut lines = vec![format_date(sample.date)];
        if let Some(v) = sample.portfolio_value {
            lines.push(format!("Portfolio: {}", format_currency(v)));
        }
        if let Some(v) = sample.benchmark_value {
            lines.push(format!("{}: {}", self.symbol, format_currency(v)));
        }
        lines
    }
}

/// Is the pointer inside the plot area?
fn is_inside(event: &PointerEvent, plot_width: f64) -> bool {
    event.time.is_some()
        && event.x >= 0.0
        && event.x <= plot_width
        && event.y >= 0.0
        && event.y <= PLOT_HEIGHT
}

/// Build the sample for a pointer event, falling back to the latest data
/// point when the pointer is outside the plot area.
pub fn sample_at(
    portfolio: &[TimePoint],
    benchmark: Option<&[TimePoint]>,
    event: &PointerEvent,
    plot_width: f64,
) -> Option<CrosshairSample> {
    if !is_inside(event, plot_width) {
        return fallback_sample(portfolio, benchmark);
    }

    let time = event.time?;
    Some(CrosshairSample {
        date: time,
        portfolio_value: value_nearest(portfolio, time),
        benchmark_value: benchmark.and_then(|b| value_nearest(b, time)),
    })
}

/// Sample of the last element of each series
pub fn fallback_sample(
    portfolio: &[TimePoint],
    benchmark: Option<&[TimePoint]>,
) -> Option<CrosshairSample> {
    let last = portfolio.last()?;
    Some(CrosshairSample {
        date: last.time,
        portfolio_value: Some(last.value),
        benchmark_value: benchmark.and_then(|b| b.last()).map(|p| p.value),
    })
}

/// Value of the series point nearest in time.
///
/// Sampling is daily so an exact match is the normal case; the binary search
/// miss arm only matters when portfolio and benchmark calendars differ.
fn value_nearest(series: &[TimePoint], time: chrono::NaiveDate) -> Option<f64> {
    if series.is_empty() {
        return None;
    }

    match series.binary_search_by(|p| p.time.cmp(&time)) {
        Ok(i) => Some(series[i].value),
        Err(0) => Some(series[0].value),
        Err(i) if i >= series.len() => Some(series[series.len() - 1].value),
        Err(i) => {
            let before = &series[i - 1];
            let after = &series[i];
            let nearer = if (time - before.time) <= (after.time - time) {
                before
            } else {
                after
            };
            Some(nearer.value)
        }
    }
}
