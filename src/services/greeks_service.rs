//! Greeks exposure chart
//!
//! Option-bearing backtests carry a greeks snapshot per history point; this
//! service plots delta, gamma, theta and vega over time as a multi-line PNG.

use chrono::NaiveDate;
use plotters::prelude::*;
use tracing::debug;

use crate::models::{Greeks, HistoryPoint};
use crate::utils::VizError;

const DELTA_COLOR: RGBColor = RGBColor(136, 132, 216);
const GAMMA_COLOR: RGBColor = RGBColor(130, 202, 157);
const THETA_COLOR: RGBColor = RGBColor(255, 198, 88);
const VEGA_COLOR: RGBColor = RGBColor(255, 115, 0);

/// Dated greeks snapshots, skipping history points without one.
///
/// Returns `None` unless at least two points carry greeks, the minimum for a
/// line chart.
pub fn greeks_points(history: &[HistoryPoint]) -> Option<Vec<(NaiveDate, Greeks)>> {
    let points: Vec<(NaiveDate, Greeks)> = history
        .iter()
        .filter_map(|h| h.greeks.map(|g| (h.date, g)))
        .collect();
    (points.len() >= 2).then_some(points)
}

/// Render the four greeks series and return the PNG bytes
pub fn render_greeks(
    history: &[HistoryPoint],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, VizError> {
    let points = greeks_points(history).ok_or(VizError::NotEnoughData)?;

    let x_min = points[0].0;
    let x_max = points[points.len() - 1].0;
    if x_min >= x_max {
        return Err(VizError::NotEnoughData);
    }
    let (y_min, y_max) = greeks_extent(&points);
    debug!(points = points.len(), "Rendering greeks exposure");

    let temp_file = std::env::temp_dir().join(format!(
        "stratviz_greeks_{}.png",
        chrono::Utc::now().timestamp_millis()
    ));

    {
        let backend = BitMapBackend::new(&temp_file, (width, height));
        let root = backend.into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| VizError::Render(format!("Failed to fill canvas: {}", e)))?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Greeks Exposure", ("sans-serif", 30.0).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| VizError::Render(format!("Failed to build chart: {}", e)))?;

        chart
            .configure_mesh()
            .y_desc("Value")
            .x_desc("Date")
            .draw()
            .map_err(|e| VizError::Render(format!("Failed to draw mesh: {}", e)))?;

        let series: [(&str, RGBColor, fn(&Greeks) -> f64); 4] = [
            ("Delta", DELTA_COLOR, |g| g.delta),
            ("Gamma", GAMMA_COLOR, |g| g.gamma),
            ("Theta", THETA_COLOR, |g| g.theta),
            ("Vega", VEGA_COLOR, |g| g.vega),
        ];
        for (label, color, value) in series {
            chart
                .draw_series(LineSeries::new(
                    points.iter().map(|(d, g)| (*d, value(g))),
                    color.stroke_width(2),
                ))
                .map_err(|e| VizError::Render(format!("Failed to draw {}: {}", label, e)))?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| VizError::Render(format!("Failed to draw labels: {}", e)))?;

        root.present()
            .map_err(|e| VizError::Render(format!("Failed to render chart: {}", e)))?;
    }

    let image_data = std::fs::read(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    Ok(image_data)
}

/// Y bounds over all four greeks, padded by 10% of the spread
fn greeks_extent(points: &[(NaiveDate, Greeks)]) -> (f64, f64) {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for (_, g) in points {
        for v in [g.delta, g.gamma, g.theta, g.vega] {
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
    }

    let spread = (max_v - min_v).max(1e-8);
    let padding = spread * 0.1;
    (min_v - padding, max_v + padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, greeks: Option<Greeks>) -> HistoryPoint {
        HistoryPoint {
            date: date.parse().unwrap(),
            total_value: 100000.0,
            drawdown: None,
            benchmark_value: None,
            greeks,
        }
    }

    fn g(delta: f64, theta: f64) -> Greeks {
        Greeks {
            delta,
            gamma: 0.1,
            theta,
            vega: 20.0,
        }
    }

    #[test]
    fn test_points_skip_snapshots_without_greeks() {
        let history = vec![
            point("2023-01-01", Some(g(100.0, -5.0))),
            point("2023-01-02", None),
            point("2023-01-03", Some(g(98.0, -5.2))),
        ];

        let points = greeks_points(&history).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[1].0, "2023-01-03".parse().unwrap());
    }

    #[test]
    fn test_equity_only_history_has_no_greeks_chart() {
        let history = vec![point("2023-01-01", None), point("2023-01-02", None)];

        assert!(greeks_points(&history).is_none());
    }

    #[test]
    fn test_single_snapshot_is_not_enough() {
        let history = vec![point("2023-01-01", Some(g(100.0, -5.0)))];

        assert!(greeks_points(&history).is_none());
    }

    #[test]
    fn test_extent_spans_negative_theta_and_positive_delta() {
        let points = vec![
            ("2023-01-01".parse().unwrap(), g(100.0, -5.0)),
            ("2023-01-02".parse().unwrap(), g(98.0, -5.2)),
        ];

        let (lo, hi) = greeks_extent(&points);

        assert!(lo < -5.2);
        assert!(hi > 100.0);
    }
}
