//! Error types shared across services

use thiserror::Error;

/// Failures a visualization run can surface to the user
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Not enough data points to render a chart (minimum 2 required)")]
    NotEnoughData,

    #[error("Failed to render chart: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse backtest result: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidArgument(String),
}
