//! Aggregation utilities for the irrigation decision-support service.
//!
//! Submodules:
//! - `windows`: trailing windows anchored on the series' own latest
//!   timestamp, and dashboard display-period filtering.
//! - `kpis`: scalar statistics (totals, means, ratios) over a window.

pub mod kpis;
pub mod windows;

pub use kpis::{efficiency, summarize, totals, Totals, KPI_RAIN_WINDOW_HOURS};
