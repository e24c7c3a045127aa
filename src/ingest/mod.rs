//! Telemetry sources.
//!
//! - `csv_file`: the stored telemetry export.
//! - `synthetic`: seeded synthetic data for demos and development.
//!
//! `load_or_generate` picks between them the way the dashboard does: the CSV
//! when it exists, otherwise a synthetic series.

pub mod csv_file;
pub mod synthetic;

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::DataConfig;
use crate::logging::Component;
use crate::model::{LoadError, TimeSeries};

/// Where a loaded series came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataOrigin {
    Csv { path: PathBuf, rows_dropped: usize },
    Synthetic { hours: usize, seed: u64 },
}

impl std::fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataOrigin::Csv { path, .. } => write!(f, "CSV {}", path.display()),
            DataOrigin::Synthetic { hours, seed } => {
                write!(f, "synthetic ({} h, seed {})", hours, seed)
            }
        }
    }
}

/// Loads the configured CSV, or generates a synthetic series ending at `end`
/// when the file does not exist.
pub fn load_or_generate(
    config: &DataConfig,
    end: NaiveDateTime,
) -> Result<(TimeSeries, DataOrigin), LoadError> {
    if config.csv_path.exists() {
        let load = csv_file::load_csv(&config.csv_path)?;
        let origin = DataOrigin::Csv {
            path: config.csv_path.clone(),
            rows_dropped: load.rows_dropped,
        };
        return Ok((load.series, origin));
    }

    tracing::info!(
        component = %Component::Loader,
        path = %config.csv_path.display(),
        "telemetry file not found, generating synthetic series"
    );
    let params = synthetic::SyntheticParams {
        hours: config.synthetic_hours,
        seed: config.seed,
        end,
    };
    let series = synthetic::generate(&params)?;
    Ok((
        series,
        DataOrigin::Synthetic {
            hours: params.hours,
            seed: params.seed,
        },
    ))
}
