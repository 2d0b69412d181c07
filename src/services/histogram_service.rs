//! Frequency distribution of terminal portfolio values
//!
//! Simulation runs produce one terminal value per Monte-Carlo trial; this
//! service bins them into a fixed-size histogram and renders it as a bar
//! chart PNG.

use plotters::prelude::*;
use tracing::debug;

use crate::models::HistogramBin;
use crate::utils::format::format_thousands;
use crate::utils::VizError;

/// Bin count used regardless of sample count
pub const DEFAULT_BIN_COUNT: usize = 20;

const BAR_COLOR: RGBColor = RGBColor(79, 70, 229);

/// Bin terminal values into `bin_count` equal-width intervals.
///
/// Returns `None` for an empty input. Every value lands in exactly one bin:
/// the index is clamped so the maximum value stays in the last bin instead of
/// overflowing past it. When all values are identical the bin width is zero;
/// every value is routed to bin 0 and the labels collapse to a single point.
pub fn bin_terminal_values(values: &[f64], bin_count: usize) -> Option<Vec<HistogramBin>> {
    if values.is_empty() || bin_count == 0 {
        return None;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (max - min) / bin_count as f64;

    let mut counts = vec![0usize; bin_count];
    for &v in values {
        let index = if step > 0.0 {
            (((v - min) / step).floor() as usize).min(bin_count - 1)
        } else {
            0
        };
        counts[index] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let range_start = min + step * i as f64;
            let range_end = min + step * (i + 1) as f64;
            HistogramBin {
                label: format!(
                    "{} - {}",
                    format_thousands(range_start),
                    format_thousands(range_end)
                ),
                count,
                range_start,
                range_end,
            }
        })
        .collect();

    Some(bins)
}

/// Render the bins as a bar chart and return the PNG bytes
pub fn render_histogram(
    bins: &[HistogramBin],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, VizError> {
    if bins.is_empty() {
        return Err(VizError::NotEnoughData);
    }

    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0);
    debug!(
        bins = bins.len(),
        max_count, "Rendering terminal value distribution"
    );

    let temp_file = std::env::temp_dir().join(format!(
        "stratviz_hist_{}.png",
        chrono::Utc::now().timestamp_millis()
    ));

    {
        let backend = BitMapBackend::new(&temp_file, (width, height));
        let root = backend.into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| VizError::Render(format!("Failed to fill canvas: {}", e)))?;

        let y_max = (max_count as f64 * 1.1).max(1.0);

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Distribution of Final Portfolio Values",
                ("sans-serif", 30.0).into_font(),
            )
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..bins.len() as f64, 0.0..y_max)
            .map_err(|e| VizError::Render(format!("Failed to build chart: {}", e)))?;

        chart
            .configure_mesh()
            .y_desc("Frequency")
            .x_desc("Final Portfolio Value")
            .x_label_formatter(&|x| {
                let idx = (x.floor() as usize).min(bins.len() - 1);
                format_thousands(bins[idx].range_start)
            })
            .draw()
            .map_err(|e| VizError::Render(format!("Failed to draw mesh: {}", e)))?;

        chart
            .draw_series(bins.iter().enumerate().map(|(i, bin)| {
                Rectangle::new(
                    [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, bin.count as f64)],
                    BAR_COLOR.filled(),
                )
            }))
            .map_err(|e| VizError::Render(format!("Failed to draw bars: {}", e)))?;

        root.present()
            .map_err(|e| VizError::Render(format!("Failed to render chart: {}", e)))?;
    }

    let image_data = std::fs::read(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    Ok(image_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evenly_spaced_values_fill_each_bin_once() {
        // 20 values evenly spaced 10..200 into 20 bins
        let values: Vec<f64> = (1..=20).map(|i| (i * 10) as f64).collect();

        let bins = bin_terminal_values(&values, 20).unwrap();

        assert_eq!(bins.len(), 20);
        assert!(bins.iter().all(|b| b.count == 1));
    }

    #[test]
    fn test_counts_sum_to_sample_count() {
        let values = vec![
            101223.4, 98500.0, 143000.9, 99999.99, 120000.0, 87500.5, 155000.0, 101000.0,
        ];

        let bins = bin_terminal_values(&values, 20).unwrap();

        let total: usize = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, values.len());
    }

    #[test]
    fn test_maximum_value_lands_in_last_bin() {
        let values = vec![0.0, 50.0, 100.0];

        let bins = bin_terminal_values(&values, 20).unwrap();

        assert_eq!(bins.last().unwrap().count, 1);
    }

    #[test]
    fn test_degenerate_identical_values_route_to_bin_zero() {
        let values = vec![500.0, 500.0, 500.0];

        let bins = bin_terminal_values(&values, 20).unwrap();

        assert_eq!(bins.len(), 20);
        assert_eq!(bins[0].count, 3);
        let total: usize = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 3);
        assert_eq!(bins[0].label, "0.5k - 0.5k");
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert!(bin_terminal_values(&[], 20).is_none());
    }

    #[test]
    fn test_bin_labels_in_thousands() {
        let values = vec![100000.0, 200000.0];

        let bins = bin_terminal_values(&values, 20).unwrap();

        assert_eq!(bins[0].label, "100.0k - 105.0k");
        assert_eq!(bins[19].label, "195.0k - 200.0k");
    }
}
