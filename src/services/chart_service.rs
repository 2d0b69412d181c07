//! Chart lifecycle controller
//!
//! Owns creation and teardown of the chart surface, keyed to the identity of
//! the input data. A data change is handled as a full teardown-then-rebuild
//! rather than an incremental series patch: backtest results are produced
//! once per run, so correctness wins over render efficiency here.
//!
//! The rendering backend enters through the `ChartSurface` trait and a
//! factory passed to the constructor; nothing is registered globally.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::models::{
    CrosshairSample, HistoryPoint, PointerEvent, RangeLabel, TimePoint, VisibleRange,
};
use crate::services::legend_service::{self, CrosshairLegend};
use crate::services::range_service;
use crate::services::series_service::{self, SeriesField};

/// Shared, identity-tracked history data. Two mounts with the same `Arc` are
/// the same data; a new allocation forces a rebuild.
pub type HistoryData = Arc<Vec<HistoryPoint>>;

/// Height is fixed; width tracks the container on resize.
pub const CHART_HEIGHT: u32 = 400;

/// Handle for the mounted rendering container
#[derive(Debug, Clone, Copy)]
pub struct Container {
    pub width: u32,
}

/// Scoped configuration handed to the surface factory
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub equity_symbol: String,
}

/// Operations the controller needs from a rendering backend
pub trait ChartSurface {
    fn set_series(&mut self, portfolio: &[TimePoint], benchmark: Option<&[TimePoint]>);
    fn set_visible_range(&mut self, range: &VisibleRange);
    fn fit_content(&mut self);
    fn apply_width(&mut self, width: u32);
}

type SurfaceFactory<S> = Box<dyn Fn(&ChartConfig) -> S>;
type SampleSink = Box<dyn FnMut(&CrosshairSample)>;

struct ActiveChart<S> {
    surface: S,
    portfolio: Vec<TimePoint>,
    benchmark: Option<Vec<TimePoint>>,
    legend: CrosshairLegend,
    sink: Option<SampleSink>,
    active_label: RangeLabel,
    // Holding the source data keeps the allocation alive, so pointer
    // identity stays unambiguous for the lifetime of this chart.
    source: HistoryData,
    benchmark_source: Option<HistoryData>,
}

impl<S> ActiveChart<S> {
    fn same_data(&self, history: &HistoryData, benchmark: Option<&HistoryData>) -> bool {
        if !Arc::ptr_eq(&self.source, history) {
            return false;
        }
        match (&self.benchmark_source, benchmark) {
            (Some(prev), Some(next)) => Arc::ptr_eq(prev, next),
            (None, None) => true,
            _ => false,
        }
    }
}

/// State machine over a single chart instance: `Uninitialized` until a valid
/// `(history, container)` pair arrives, `Active` afterwards, back to
/// `Uninitialized` on teardown.
pub struct ChartController<S: ChartSurface> {
    symbol: String,
    width: u32,
    factory: SurfaceFactory<S>,
    active: Option<ActiveChart<S>>,
}

impl<S: ChartSurface> ChartController<S> {
    pub fn new(equity_symbol: &str, factory: SurfaceFactory<S>) -> Self {
        ChartController {
            symbol: equity_symbol.to_string(),
            width: 0,
            factory,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Drive the lifecycle from the current inputs.
    ///
    /// Empty history or a missing container keeps (or returns) the controller
    /// in `Uninitialized` without erroring. Same data identity while active is
    /// a no-op; changed identity tears the chart down and rebuilds it.
    pub fn mount(
        &mut self,
        history: &HistoryData,
        benchmark: Option<&HistoryData>,
        container: Option<&Container>,
    ) {
        let Some(container) = container else {
            trace!("Mount skipped: container not ready");
            self.teardown();
            return;
        };
        if history.is_empty() {
            trace!("Mount skipped: empty history");
            self.teardown();
            return;
        }

        if let Some(active) = &self.active {
            if active.same_data(history, benchmark) {
                return;
            }
        }

        self.teardown();
        self.width = container.width;

        let portfolio = series_service::to_series(history, SeriesField::TotalValue);
        let benchmark_series = benchmark
            .map(|b| series_service::to_series(b, SeriesField::BenchmarkValue))
            .filter(|s| !s.is_empty());

        let config = ChartConfig {
            width: container.width,
            height: CHART_HEIGHT,
            equity_symbol: self.symbol.clone(),
        };
        let mut surface = (self.factory)(&config);
        surface.set_series(&portfolio, benchmark_series.as_deref());
        surface.fit_content();

        let legend = CrosshairLegend::new(
            &self.symbol,
            legend_service::fallback_sample(&portfolio, benchmark_series.as_deref()),
        );

        debug!(
            points = portfolio.len(),
            benchmark = benchmark_series.is_some(),
            "Chart mounted"
        );

        self.active = Some(ActiveChart {
            surface,
            portfolio,
            benchmark: benchmark_series,
            legend,
            sink: None,
            active_label: RangeLabel::All,
            source: history.clone(),
            benchmark_source: benchmark.cloned(),
        });
    }

    /// Destroy the chart instance and drop all listeners. Idempotent.
    pub fn teardown(&mut self) {
        if self.active.take().is_some() {
            debug!("Chart torn down");
        }
    }

    /// Track the container width while active; height stays fixed.
    pub fn on_resize(&mut self, container_width: u32) {
        if let Some(active) = &mut self.active {
            self.width = container_width;
            active.surface.apply_width(container_width);
            trace!(width = container_width, "Chart resized");
        }
    }

    /// Recompute the crosshair sample for a pointer event and notify the
    /// legend and any subscriber. No-op while uninitialized.
    pub fn on_pointer_move(&mut self, event: &PointerEvent) -> Option<CrosshairSample> {
        let width = self.width;
        let active = self.active.as_mut()?;

        let sample = legend_service::sample_at(
            &active.portfolio,
            active.benchmark.as_deref(),
            event,
            width as f64,
        )?;
        active.legend.on_sample(&sample);
        if let Some(sink) = &mut active.sink {
            sink(&sample);
        }
        Some(sample)
    }

    /// Subscribe to crosshair samples for the current lifecycle.
    ///
    /// The callback fires immediately with the current fallback sample and is
    /// dropped at teardown. Returns false while uninitialized.
    pub fn subscribe_crosshair(
        &mut self,
        mut sink: impl FnMut(&CrosshairSample) + 'static,
    ) -> bool {
        let Some(active) = &mut self.active else {
            return false;
        };
        if let Some(current) = active.legend.current() {
            sink(current);
        }
        active.sink = Some(Box::new(sink));
        true
    }

    /// Apply a zoom preset to the time axis. `ALL` fits to full content;
    /// bounded labels window the last N calendar months. No-op while
    /// uninitialized.
    pub fn select_range(&mut self, label: RangeLabel) {
        let Some(active) = &mut self.active else {
            return;
        };

        active.active_label = label;
        match range_service::select_range(label, &active.portfolio) {
            Some(range) => active.surface.set_visible_range(&range),
            None => active.surface.fit_content(),
        }
        debug!(%label, "Range selected");
    }

    /// The zoom label currently highlighted, display state only
    pub fn active_label(&self) -> Option<RangeLabel> {
        self.active.as_ref().map(|a| a.active_label)
    }

    pub fn legend_lines(&self) -> Vec<String> {
        self.active
            .as_ref()
            .map(|a| a.legend.lines())
            .unwrap_or_default()
    }

    pub fn surface(&self) -> Option<&S> {
        self.active.as_ref().map(|a| &a.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Months, NaiveDate};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum SurfaceEvent {
        Created { benchmark: bool },
        VisibleRange(VisibleRange),
        FitContent,
        Width(u32),
    }

    struct RecordingSurface {
        events: Rc<RefCell<Vec<SurfaceEvent>>>,
    }

    impl ChartSurface for RecordingSurface {
        fn set_series(&mut self, _portfolio: &[TimePoint], benchmark: Option<&[TimePoint]>) {
            self.events.borrow_mut().push(SurfaceEvent::Created {
                benchmark: benchmark.is_some(),
            });
        }

        fn set_visible_range(&mut self, range: &VisibleRange) {
            self.events
                .borrow_mut()
                .push(SurfaceEvent::VisibleRange(*range));
        }

        fn fit_content(&mut self) {
            self.events.borrow_mut().push(SurfaceEvent::FitContent);
        }

        fn apply_width(&mut self, width: u32) {
            self.events.borrow_mut().push(SurfaceEvent::Width(width));
        }
    }

    fn controller_with_log() -> (
        ChartController<RecordingSurface>,
        Rc<RefCell<Vec<SurfaceEvent>>>,
    ) {
        let events: Rc<RefCell<Vec<SurfaceEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let log = events.clone();
        let controller = ChartController::new(
            "QQQ",
            Box::new(move |_cfg: &ChartConfig| RecordingSurface {
                events: log.clone(),
            }),
        );
        (controller, events)
    }

    fn history(days: u32) -> HistoryData {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        Arc::new(
            (0..days)
                .map(|i| HistoryPoint {
                    date: start + chrono::Duration::days(i as i64),
                    total_value: 100000.0 + i as f64 * 100.0,
                    drawdown: None,
                    benchmark_value: Some(100000.0 + i as f64 * 80.0),
                    greeks: None,
                })
                .collect(),
        )
    }

    #[test]
    fn test_mount_requires_container_and_data() {
        let (mut controller, events) = controller_with_log();

        controller.mount(&history(10), None, None);
        assert!(!controller.is_active());

        controller.mount(&Arc::new(Vec::new()), None, Some(&Container { width: 960 }));
        assert!(!controller.is_active());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_mount_builds_series_and_fits_content() {
        let (mut controller, events) = controller_with_log();
        let data = history(10);

        controller.mount(&data, Some(&data), Some(&Container { width: 960 }));

        assert!(controller.is_active());
        let log = events.borrow();
        assert!(matches!(log[0], SurfaceEvent::Created { benchmark: true }));
        assert_eq!(log[1], SurfaceEvent::FitContent);
    }

    #[test]
    fn test_same_data_identity_is_noop() {
        let (mut controller, events) = controller_with_log();
        let data = history(10);
        let container = Container { width: 960 };

        controller.mount(&data, None, Some(&container));
        let count = events.borrow().len();
        controller.mount(&data, None, Some(&container));

        assert_eq!(events.borrow().len(), count);
    }

    #[test]
    fn test_changed_data_identity_rebuilds() {
        let (mut controller, events) = controller_with_log();
        let container = Container { width: 960 };

        controller.mount(&history(10), None, Some(&container));
        controller.mount(&history(20), None, Some(&container));

        let creates = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Created { .. }))
            .count();
        assert_eq!(creates, 2);
    }

    #[test]
    fn test_new_allocation_rebuilds_even_after_old_handle_dropped() {
        // A fresh allocation can reuse the old address once the caller's
        // handle is gone; it must still count as new data.
        let (mut controller, events) = controller_with_log();
        let container = Container { width: 960 };

        {
            let data = history(10);
            controller.mount(&data, None, Some(&container));
        }
        controller.mount(&history(10), None, Some(&container));

        let creates = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Created { .. }))
            .count();
        assert_eq!(creates, 2);
    }

    #[test]
    fn test_benchmark_presence_change_rebuilds() {
        let (mut controller, events) = controller_with_log();
        let container = Container { width: 960 };
        let data = history(10);

        controller.mount(&data, None, Some(&container));
        controller.mount(&data, Some(&data), Some(&container));

        let creates = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Created { .. }))
            .count();
        assert_eq!(creates, 2);
    }

    #[test]
    fn test_resize_tracks_container_width_only_while_active() {
        let (mut controller, events) = controller_with_log();

        controller.on_resize(500);
        assert!(events.borrow().is_empty());

        let data = history(10);
        controller.mount(&data, None, Some(&Container { width: 960 }));
        controller.on_resize(720);

        assert!(events.borrow().contains(&SurfaceEvent::Width(720)));
    }

    #[test]
    fn test_select_range_windows_last_month() {
        let (mut controller, events) = controller_with_log();
        let data = history(90);

        controller.mount(&data, None, Some(&Container { width: 960 }));
        controller.select_range(RangeLabel::OneMonth);

        let last = data.last().unwrap().date;
        let expected = VisibleRange {
            from: last.checked_sub_months(Months::new(1)).unwrap(),
            to: last,
        };
        assert!(events
            .borrow()
            .contains(&SurfaceEvent::VisibleRange(expected)));
        assert_eq!(controller.active_label(), Some(RangeLabel::OneMonth));
    }

    #[test]
    fn test_select_range_all_fits_content() {
        let (mut controller, events) = controller_with_log();
        let data = history(90);

        controller.mount(&data, None, Some(&Container { width: 960 }));
        events.borrow_mut().clear();
        controller.select_range(RangeLabel::All);

        assert_eq!(events.borrow().as_slice(), &[SurfaceEvent::FitContent]);
    }

    #[test]
    fn test_select_range_uninitialized_is_noop() {
        let (mut controller, events) = controller_with_log();

        controller.select_range(RangeLabel::OneYear);

        assert!(events.borrow().is_empty());
        assert_eq!(controller.active_label(), None);
    }

    #[test]
    fn test_legend_never_blank_after_mount() {
        let (mut controller, _) = controller_with_log();
        let data = history(10);

        controller.mount(&data, None, Some(&Container { width: 960 }));

        let lines = controller.legend_lines();
        assert!(!lines.is_empty());
        assert!(lines[0].contains("2023-01-10"));
    }

    #[test]
    fn test_pointer_move_notifies_subscriber() {
        let (mut controller, _) = controller_with_log();
        let data = history(10);
        controller.mount(&data, None, Some(&Container { width: 960 }));

        let seen: Rc<RefCell<Vec<CrosshairSample>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        assert!(controller.subscribe_crosshair(move |s| sink.borrow_mut().push(*s)));
        // Initial fallback sample fires on subscribe
        assert_eq!(seen.borrow().len(), 1);

        let event = PointerEvent {
            time: Some(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap()),
            x: 100.0,
            y: 100.0,
        };
        let sample = controller.on_pointer_move(&event).unwrap();

        assert_eq!(sample.portfolio_value, Some(100400.0));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_teardown_is_idempotent_and_silences_listeners() {
        let (mut controller, events) = controller_with_log();
        let data = history(10);
        controller.mount(&data, None, Some(&Container { width: 960 }));

        let fired = Rc::new(RefCell::new(0u32));
        let sink = fired.clone();
        controller.subscribe_crosshair(move |_| *sink.borrow_mut() += 1);
        let fired_before = *fired.borrow();

        controller.teardown();
        controller.teardown();
        assert!(!controller.is_active());

        events.borrow_mut().clear();
        controller.on_resize(500);
        let event = PointerEvent {
            time: Some(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap()),
            x: 100.0,
            y: 100.0,
        };
        assert!(controller.on_pointer_move(&event).is_none());

        assert!(events.borrow().is_empty());
        assert_eq!(*fired.borrow(), fired_before);
    }
}
