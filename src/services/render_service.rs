//! Plotters-backed chart surface
//!
//! Draws the portfolio area series, the benchmark line and the legend overlay
//! into a PNG. The surface only caches what the controller hands it; all
//! drawing happens in `render_png`.

use plotters::prelude::*;
use tracing::debug;

use crate::models::{TimePoint, VisibleRange};
use crate::services::chart_service::{ChartConfig, ChartSurface};
use crate::utils::VizError;

const PORTFOLIO_COLOR: RGBColor = RGBColor(30, 58, 138);
const BENCHMARK_COLOR: RGBColor = RGBColor(107, 114, 128);
const TEXT_COLOR: RGBColor = RGBColor(51, 51, 51);

pub struct PlottersSurface {
    width: u32,
    height: u32,
    symbol: String,
    portfolio: Vec<TimePoint>,
    benchmark: Option<Vec<TimePoint>>,
    visible: Option<VisibleRange>,
}

impl PlottersSurface {
    pub fn new(config: &ChartConfig) -> Self {
        PlottersSurface {
            width: config.width,
            height: config.height,
            symbol: config.equity_symbol.clone(),
            portfolio: Vec::new(),
            benchmark: None,
            visible: None,
        }
    }

    /// Render the current series and visible window as PNG bytes
    pub fn render_png(&self, legend_lines: &[String]) -> Result<Vec<u8>, VizError> {
        let portfolio = clip_to_range(&self.portfolio, self.visible.as_ref());
        let benchmark = self
            .benchmark
            .as_ref()
            .map(|b| clip_to_range(b, self.visible.as_ref()));

        if portfolio.len() < 2 {
            return Err(VizError::NotEnoughData);
        }

        let x_min = portfolio[0].time;
        let x_max = portfolio[portfolio.len() - 1].time;
        if x_min >= x_max {
            return Err(VizError::NotEnoughData);
        }

        let (y_min, y_max) = value_extent(&portfolio, benchmark.as_deref());
        debug!(
            points = portfolio.len(),
            %x_min,
            %x_max,
            "Rendering performance chart"
        );

        let temp_file = std::env::temp_dir().join(format!(
            "stratviz_chart_{}.png",
            chrono::Utc::now().timestamp_millis()
        ));

        {
            let backend = BitMapBackend::new(&temp_file, (self.width, self.height));
            let root = backend.into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| VizError::Render(format!("Failed to fill canvas: {}", e)))?;

            let caption = if benchmark.is_some() {
                format!("Portfolio Performance vs {} (Benchmark)", self.symbol)
            } else {
                "Portfolio Performance".to_string()
            };

            let mut chart = ChartBuilder::on(&root)
                .caption(&caption, ("sans-serif", 30.0).into_font())
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(70)
                .build_cartesian_2d(x_min..x_max, y_min..y_max)
                .map_err(|e| VizError::Render(format!("Failed to build chart: {}", e)))?;

            chart
                .configure_mesh()
                .y_desc("Portfolio Value ($)")
                .x_desc("Date")
                .draw()
                .map_err(|e| VizError::Render(format!("Failed to draw mesh: {}", e)))?;

            chart
                .draw_series(
                    AreaSeries::new(
                        portfolio.iter().map(|p| (p.time, p.value)),
                        y_min,
                        PORTFOLIO_COLOR.mix(0.25),
                    )
                    .border_style(PORTFOLIO_COLOR.stroke_width(2)),
                )
                .map_err(|e| VizError::Render(format!("Failed to draw portfolio: {}", e)))?;

            if let Some(bench) = &benchmark {
                chart
                    .draw_series(LineSeries::new(
                        bench.iter().map(|p| (p.time, p.value)),
                        BENCHMARK_COLOR.stroke_width(2),
                    ))
                    .map_err(|e| VizError::Render(format!("Failed to draw benchmark: {}", e)))?;
            }

            // Legend overlay, positioned inside the plot's top-left corner
            for (i, line) in legend_lines.iter().enumerate() {
                root.draw(&Text::new(
                    line.clone(),
                    (90, 50 + 18 * i as i32),
                    ("sans-serif", 16).into_font().color(&TEXT_COLOR),
                ))
                .map_err(|e| VizError::Render(format!("Failed to draw legend: {}", e)))?;
            }

            root.present()
                .map_err(|e| VizError::Render(format!("Failed to render chart: {}", e)))?;
        }

        let image_data = std::fs::read(&temp_file)?;
        let _ = std::fs::remove_file(&temp_file);

        Ok(image_data)
    }
}

impl ChartSurface for PlottersSurface {
    fn set_series(&mut self, portfolio: &[TimePoint], benchmark: Option<&[TimePoint]>) {
        self.portfolio = portfolio.to_vec();
        self.benchmark = benchmark.map(|b| b.to_vec());
    }

    fn set_visible_range(&mut self, range: &VisibleRange) {
        self.visible = Some(*range);
    }

    fn fit_content(&mut self) {
        self.visible = None;
    }

    fn apply_width(&mut self, width: u32) {
        self.width = width;
    }
}

fn clip_to_range(series: &[TimePoint], range: Option<&VisibleRange>) -> Vec<TimePoint> {
    match range {
        None => series.to_vec(),
        Some(r) => series
            .iter()
            .filter(|p| p.time >= r.from && p.time <= r.to)
            .copied()
            .collect(),
    }
}

/// Y bounds over all plotted values, padded by 10% of the spread
fn value_extent(portfolio: &[TimePoint], benchmark: Option<&[TimePoint]>) -> (f64, f64) {
    let values = portfolio
        .iter()
        .chain(benchmark.into_iter().flatten())
        .map(|p| p.value);

    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for v in values {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }

    // Avoid a degenerate axis when the series is flat
    let spread = (max_v - min_v).max(1e-8);
    let padding = spread * 0.1;
    ((min_v - padding).max(0.0), max_v + padding)
}
