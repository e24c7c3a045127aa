//! Core data types for the irrigation decision-support service.
//!
//! This module defines the shared domain model imported by all other modules:
//! the hourly observation, the ordered time series built from it, the KPI and
//! recommendation outputs, and the error types. It performs no I/O.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Preferred timestamp column of a telemetry CSV.
pub const COL_TIMESTAMP: &str = "timestamp";

/// Water-sheet depth, in centimetres.
pub const COL_DEPTH: &str = "lamina_cm";

/// Pump flow rate, in cubic metres per hour.
pub const COL_FLOW: &str = "vazao_m3h";

/// Energy drawn during the hour, in kWh.
pub const COL_ENERGY: &str = "energia_kwh";

/// Rainfall during the hour, in millimetres.
pub const COL_RAIN: &str = "chuva_mm";

/// Pump state flag (0/1).
pub const COL_PUMP: &str = "bomba_ligada";

// ---------------------------------------------------------------------------
// Observation and series
// ---------------------------------------------------------------------------

/// One hourly sample of irrigation telemetry.
///
/// Timestamps are timezone-naive, exactly as the field loggers record them.
/// Values are taken as delivered by the loader; the domain bounds (depth in
/// roughly 4.5–12 cm, non-negative flow/energy/rain) are not re-validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub depth_cm: f64,
    pub flow_m3h: f64,
    pub energy_kwh: f64,
    pub rain_mm: f64,
    pub pump_on: bool,
}

/// A non-empty sequence of observations in ascending timestamp order.
///
/// Built once by a loader and read-only afterwards. Window operations
/// (`trailing`, `filtered` in `analysis::windows`) hand out slices or
/// independent copies and never touch the source rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

#[allow(clippy::len_without_is_empty)]
impl TimeSeries {
    /// Builds a series, sorting rows by timestamp.
    ///
    /// The sort is stable, so rows sharing a timestamp keep their input order.
    /// Duplicates are kept. Returns `SeriesError::Empty` for an empty input.
    pub fn new(mut observations: Vec<Observation>) -> Result<Self, SeriesError> {
        if observations.is_empty() {
            return Err(SeriesError::Empty);
        }
        observations.sort_by_key(|o| o.timestamp);
        Ok(Self { observations })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    /// The chronologically last row.
    pub fn latest(&self) -> &Observation {
        &self.observations[self.observations.len() - 1]
    }

    /// The chronologically first row.
    pub fn earliest(&self) -> &Observation {
        &self.observations[0]
    }

    /// `max(timestamp)`: the reference "now" for every rolling window.
    pub fn latest_timestamp(&self) -> NaiveDateTime {
        self.latest().timestamp
    }

    pub fn earliest_timestamp(&self) -> NaiveDateTime {
        self.earliest().timestamp
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

// ---------------------------------------------------------------------------
// Display period
// ---------------------------------------------------------------------------

/// Time filter applied by the dashboard before computing KPIs.
///
/// Only the KPI tiles see the filtered rows; the recommendation always runs
/// on the full history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayPeriod {
    #[serde(rename = "24h")]
    Last24h,
    #[serde(rename = "3d")]
    Last3Days,
    #[default]
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "all")]
    All,
}

impl DisplayPeriod {
    /// Length of the period in hours, `None` for the whole history.
    pub fn hours(self) -> Option<u32> {
        match self {
            DisplayPeriod::Last24h => Some(24),
            DisplayPeriod::Last3Days => Some(72),
            DisplayPeriod::Last7Days => Some(168),
            DisplayPeriod::All => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayPeriod::Last24h => "last 24h",
            DisplayPeriod::Last3Days => "last 3 days",
            DisplayPeriod::Last7Days => "last 7 days",
            DisplayPeriod::All => "all",
        }
    }
}

impl fmt::Display for DisplayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DisplayPeriod::Last24h => "24h",
            DisplayPeriod::Last3Days => "3d",
            DisplayPeriod::Last7Days => "7d",
            DisplayPeriod::All => "all",
        };
        f.write_str(tag)
    }
}

impl FromStr for DisplayPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "24h" | "1d" => Ok(DisplayPeriod::Last24h),
            "3d" | "72h" => Ok(DisplayPeriod::Last3Days),
            "7d" | "168h" => Ok(DisplayPeriod::Last7Days),
            "all" => Ok(DisplayPeriod::All),
            other => Err(format!(
                "unknown period '{}': expected one of 24h, 3d, 7d, all",
                other
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// KPI snapshot
// ---------------------------------------------------------------------------

/// Scalar statistics over one window of the series.
///
/// `efficiency_kwh_per_m3` is `None` when no water was pumped. Presentation
/// may print it as zero; decision logic must not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSnapshot {
    pub mean_depth_cm: f64,
    pub total_energy_kwh: f64,
    pub total_volume_m3: f64,
    pub efficiency_kwh_per_m3: Option<f64>,
    pub pump_hours: usize,
    pub rain_24h_mm: f64,
}

// ---------------------------------------------------------------------------
// Recommendation types
// ---------------------------------------------------------------------------

/// Alert level of a recommendation, in ascending order of severity.
///
/// The presentation layer picks its visual treatment from the lowercase tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decision rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    RainfallHold,
    HighDepth,
    LowDepth,
    EfficiencyDegradation,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::RainfallHold => "rainfall hold",
            Rule::HighDepth => "high water sheet",
            Rule::LowDepth => "low water sheet",
            Rule::EfficiencyDegradation => "efficiency degradation",
        };
        f.write_str(name)
    }
}

/// Values the rules were evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleInputs {
    pub rain_24h_mm: f64,
    pub current_depth_cm: f64,
    /// Energy per volume over the short recent window.
    pub recent_efficiency: Option<f64>,
    /// Energy per volume over every pump-on row of the history.
    pub baseline_efficiency: Option<f64>,
}

/// Output of one rule evaluation. Built fresh on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub messages: Vec<String>,
    /// Rules that fired, in evaluation order. Empty for the fallback message.
    pub fired: Vec<Rule>,
    pub inputs: RuleInputs,
}

impl Recommendation {
    pub fn has_fired(&self, rule: Rule) -> bool {
        self.fired.contains(&rule)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised when building a `TimeSeries`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("time series must contain at least one observation")]
    Empty,
}

/// Errors raised while generating a synthetic series.
#[derive(Debug, Error)]
pub enum SyntheticError {
    #[error("invalid distribution parameters: {0}")]
    Distribution(#[from] rand_distr::NormalError),
    #[error("a {hours} h series ending at {end} is outside the supported range")]
    OutOfRange { hours: usize, end: NaiveDateTime },
    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Errors raised by the external loaders.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no timestamp column found (expected 'timestamp' or a column containing 'data'/'hora')")]
    NoTimestampColumn,
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("line {line}: invalid value {value:?} in column '{column}'")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },
    #[error("no rows with a parseable timestamp")]
    Empty,
    #[error("synthetic generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
