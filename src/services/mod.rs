//! Behavioral units of the visualization core
//!
//! Each service is a thin, mostly pure module: the chart controller owns the
//! only long-lived state (the active chart lifecycle), everything else maps
//! inputs to outputs.

pub mod chart_service;
pub mod export_service;
pub mod greeks_service;
pub mod histogram_service;
pub mod legend_service;
pub mod range_service;
pub mod render_service;
pub mod series_service;
