//! Irrigation operations analytics.
//!
//! Ingests hourly irrigation telemetry (water-sheet depth, flow, energy,
//! rainfall, pump state), computes operational KPIs and produces rule-based
//! recommendations for irrigation management.
//!
//! ## Modules
//!
//! - **model**: observations, the ordered time series, KPI and recommendation types
//! - **analysis**: rolling windows and the KPI aggregator
//! - **alert**: rule thresholds and the recommendation engine
//! - **ingest**: CSV loader and synthetic generator
//! - **report**: dashboard report handed to the presentation layer

pub mod alert;
pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;

pub use alert::{evaluate, evaluate_with, RuleThresholds};
pub use analysis::summarize;
pub use config::AppConfig;
pub use model::{
    DisplayPeriod, KpiSnapshot, LoadError, Observation, Recommendation, Rule, RuleInputs,
    SeriesError, Severity, TimeSeries,
};
pub use report::DashboardReport;
