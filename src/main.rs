use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod demo;
mod models;
mod services;
mod utils;

use models::{BacktestResult, PointerEvent, RangeLabel};
use services::chart_service::{ChartController, Container};
use services::render_service::PlottersSurface;
use services::{export_service, greeks_service, histogram_service, range_service};
use utils::format::format_currency;
use utils::{Table, VizError};

const CHART_WIDTH: u32 = 960;
const TRADE_ROWS_SHOWN: usize = 20;

fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("stratviz=debug".parse().unwrap()),
        )
        .with_target(true)
        .init();

    info!("Starting stratviz...");

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), VizError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = Options::parse(&args)?;

    let result = if options.demo {
        info!("No results file given, generating synthetic demo backtest");
        demo::synthetic_result()
    } else {
        load_result(&options.input)?
    };

    info!(
        backtest_id = %result.backtest_id,
        days = result.history.len(),
        trades = result.trades.len(),
        simulation = result.is_simulation.unwrap_or(false),
        "Loaded backtest result"
    );

    print_summary(&result);

    let history = Arc::new(result.history.clone());
    let benchmark = result.has_benchmark().then(|| history.clone());

    let mut controller = ChartController::new(
        &result.params.equity_symbol,
        Box::new(PlottersSurface::new),
    );
    controller.mount(&history, benchmark.as_ref(), Some(&Container { width: CHART_WIDTH }));
    if !controller.is_active() {
        return Err(VizError::NotEnoughData);
    }
    controller.subscribe_crosshair(|sample| {
        debug!(date = %sample.date, "Crosshair sample");
    });

    if let Some(width) = options.width {
        controller.on_resize(width);
    }

    controller.select_range(options.range);
    info!(
        "Active range: {}",
        controller.active_label().unwrap_or_default()
    );

    // Pin the legend to a specific date instead of the latest point
    if let Some(date) = options.legend_at {
        controller.on_pointer_move(&PointerEvent {
            time: Some(date),
            x: 1.0,
            y: 1.0,
        });
    }

    let surface = controller.surface().ok_or(VizError::NotEnoughData)?;
    let png = surface.render_png(&controller.legend_lines())?;
    let chart_path = options
        .out_dir
        .join(format!("backtest_chart_{}.png", result.backtest_id));
    std::fs::write(&chart_path, png)?;
    info!("Wrote performance chart to {}", chart_path.display());

    if let Some(values) = result.final_portfolio_values.as_deref() {
        if let Some(bins) =
            histogram_service::bin_terminal_values(values, histogram_service::DEFAULT_BIN_COUNT)
        {
            let png = histogram_service::render_histogram(&bins, CHART_WIDTH, 480)?;
            let hist_path = options
                .out_dir
                .join(format!("terminal_distribution_{}.png", result.backtest_id));
            std::fs::write(&hist_path, png)?;
            info!(
                trials = values.len(),
                "Wrote terminal value distribution to {}",
                hist_path.display()
            );
        }
    }

    if greeks_service::greeks_points(&result.history).is_some() {
        let png = greeks_service::render_greeks(&result.history, CHART_WIDTH, 600)?;
        let greeks_path = options
            .out_dir
            .join(format!("greeks_exposure_{}.png", result.backtest_id));
        std::fs::write(&greeks_path, png)?;
        info!("Wrote greeks exposure chart to {}", greeks_path.display());
    }

    if !result.trades.is_empty() {
        let csv_path = options
            .out_dir
            .join(format!("backtest_results_{}.csv", result.backtest_id));
        std::fs::write(&csv_path, export_service::trades_to_csv(&result.trades))?;
        info!("Wrote trade log to {}", csv_path.display());
    }

    controller.teardown();
    Ok(())
}

struct Options {
    demo: bool,
    input: PathBuf,
    range: RangeLabel,
    out_dir: PathBuf,
    width: Option<u32>,
    legend_at: Option<NaiveDate>,
}

impl Options {
    const USAGE: &'static str = "Usage: stratviz <results.json | --demo> \
        [--range 1M|6M|1Y|ALL] [--at YYYY-MM-DD] [--width PX] [--out DIR]";

    fn parse(args: &[String]) -> Result<Self, VizError> {
        let mut options = Options {
            demo: false,
            input: PathBuf::new(),
            range: RangeLabel::All,
            out_dir: PathBuf::from("."),
            width: None,
            legend_at: None,
        };

        let mut iter = args.iter();
        let mut have_input = false;
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--demo" => {
                    options.demo = true;
                    have_input = true;
                }
                "--range" => {
                    let label = iter
                        .next()
                        .ok_or_else(|| VizError::InvalidArgument("--range needs a value".into()))?;
                    options.range =
                        range_service::parse_range_label(label).map_err(VizError::InvalidArgument)?;
                }
                "--out" => {
                    let dir = iter
                        .next()
                        .ok_or_else(|| VizError::InvalidArgument("--out needs a value".into()))?;
                    options.out_dir = PathBuf::from(dir);
                }
                "--width" => {
                    let px = iter
                        .next()
                        .ok_or_else(|| VizError::InvalidArgument("--width needs a value".into()))?;
                    options.width = Some(px.parse().map_err(|_| {
                        VizError::InvalidArgument(format!("Invalid width: '{}'", px))
                    })?);
                }
                "--at" => {
                    let date = iter
                        .next()
                        .ok_or_else(|| VizError::InvalidArgument("--at needs a value".into()))?;
                    options.legend_at = Some(date.parse().map_err(|_| {
                        VizError::InvalidArgument(format!(
                            "Invalid date: '{}' (use YYYY-MM-DD)",
                            date
                        ))
                    })?);
                }
                path if !have_input => {
                    options.input = PathBuf::from(path);
                    have_input = true;
                }
                other => {
                    return Err(VizError::InvalidArgument(format!(
                        "Unexpected argument '{}'. {}",
                        other,
                        Self::USAGE
                    )));
                }
            }
        }

        if !have_input {
            return Err(VizError::InvalidArgument(Self::USAGE.to_string()));
        }
        Ok(options)
    }
}

fn load_result(path: &Path) -> Result<BacktestResult, VizError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_summary(result: &BacktestResult) {
    let mut metrics = Table::new(&["Metric", "Value"]);
    metrics.add_row(vec![
        "Total Return".to_string(),
        format!("{:.2}%", result.total_return),
    ]);
    metrics.add_row(vec!["CAGR".to_string(), format!("{:.2}%", result.cagr)]);
    metrics.add_row(vec![
        "Max Drawdown".to_string(),
        format!("{:.2}%", result.max_drawdown),
    ]);
    metrics.add_row(vec![
        "Sharpe Ratio".to_string(),
        format!("{:.2}", result.sharpe_ratio),
    ]);
    metrics.add_row(vec![
        "Initial Capital".to_string(),
        format_currency(result.params.initial_capital),
    ]);
    println!(
        "\nBacktest Results ({}, {} to {})\n",
        result.params.equity_symbol,
        utils::format::format_date(result.params.start_date),
        utils::format::format_date(result.params.end_date),
    );
    println!("{}", metrics.render());

    if result.trades.is_empty() {
        return;
    }

    let mut trades = Table::new(&["Date", "Type", "Asset", "Qty", "Price", "Value", "Reason"]);
    for t in result.trades.iter().take(TRADE_ROWS_SHOWN) {
        trades.add_row(vec![
            utils::format::format_date(t.date),
            t.kind.clone(),
            t.asset.clone(),
            format!("{:.4}", t.quantity),
            format_currency(t.price),
            format_currency(t.value),
            t.reason.clone(),
        ]);
    }
    println!("Trade History\n");
    println!("{}", trades.render());
    if result.trades.len() > TRADE_ROWS_SHOWN {
        println!(
            "... and {} more trades (see CSV export)",
            result.trades.len() - TRADE_ROWS_SHOWN
        );
    }
}
