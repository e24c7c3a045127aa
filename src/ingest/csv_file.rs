//! Telemetry CSV loader.
//!
//! Reads hourly irrigation telemetry exported by the field logger / SCADA
//! historian. Expected header (column order is free):
//!
//! ```text
//! timestamp,lamina_cm,vazao_m3h,energia_kwh,chuva_mm,bomba_ligada
//! 2024-11-10 12:00:00,7.42,76.1,54.8,0.0,1
//! ```
//!
//! When there is no `timestamp` column the first column whose name contains
//! `data` or `hora` is used instead. Rows whose timestamp cannot be parsed
//! are dropped and counted; any other malformed cell is an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io;
use std::path::Path;

use crate::logging;
use crate::model::{
    LoadError, Observation, TimeSeries, COL_DEPTH, COL_ENERGY, COL_FLOW, COL_PUMP, COL_RAIN,
    COL_TIMESTAMP,
};

/// Date-time layouts tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only layouts, read as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Result of reading one CSV source.
#[derive(Debug, Clone)]
pub struct CsvLoad {
    pub series: TimeSeries,
    /// Data rows in the file.
    pub rows_read: usize,
    /// Rows discarded for an unparseable timestamp.
    pub rows_dropped: usize,
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Parses a timezone-naive timestamp.
///
/// RFC 3339 values carrying an offset keep their local wall-clock time and
/// lose the offset. Returns `None` for anything unrecognised.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parses a pump-state cell: `1`/`0`, `1.0`/`0.0`, `true`/`false`.
pub fn parse_pump_flag(raw: &str) -> Option<bool> {
    let s = raw.trim();
    match s.to_ascii_lowercase().as_str() {
        "true" => return Some(true),
        "false" => return Some(false),
        _ => {}
    }
    s.parse::<f64>().ok().and_then(|v| {
        if v == 1.0 {
            Some(true)
        } else if v == 0.0 {
            Some(false)
        } else {
            None
        }
    })
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

struct Columns {
    timestamp: usize,
    depth: usize,
    flow: usize,
    energy: usize,
    rain: usize,
    pump: usize,
}

fn find_timestamp_column(headers: &StringRecord) -> Option<usize> {
    headers
        .iter()
        .position(|h| h == COL_TIMESTAMP)
        .or_else(|| {
            headers.iter().position(|h| {
                let lower = h.to_lowercase();
                lower.contains("data") || lower.contains("hora")
            })
        })
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns, LoadError> {
    let required = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };
    Ok(Columns {
        timestamp: find_timestamp_column(headers).ok_or(LoadError::NoTimestampColumn)?,
        depth: required(COL_DEPTH)?,
        flow: required(COL_FLOW)?,
        energy: required(COL_ENERGY)?,
        rain: required(COL_RAIN)?,
        pump: required(COL_PUMP)?,
    })
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Reads telemetry from any CSV byte stream.
pub fn read_csv<R: io::Read>(reader: R) -> Result<CsvLoad, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    read_records(&mut reader, "<stream>")
}

/// Reads telemetry from a CSV file.
pub fn load_csv(path: &Path) -> Result<CsvLoad, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.display().to_string(),
            source,
        })?;
    read_records(&mut reader, &path.display().to_string())
}

fn read_records<R: io::Read>(
    reader: &mut csv::Reader<R>,
    source: &str,
) -> Result<CsvLoad, LoadError> {
    let headers = reader.headers()?.clone();
    let cols = resolve_columns(&headers)?;

    let mut observations = Vec::new();
    let mut rows_read = 0;
    let mut rows_dropped = 0;

    for result in reader.records() {
        let record = result?;
        rows_read += 1;
        let line = record.position().map_or(0, |p| p.line());
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let Some(timestamp) = parse_timestamp(cell(cols.timestamp)) else {
            rows_dropped += 1;
            tracing::debug!(
                component = %logging::Component::Loader,
                line,
                value = cell(cols.timestamp),
                "dropping row with unparseable timestamp"
            );
            continue;
        };

        let number = |idx: usize, column: &str| {
            parse_number(cell(idx)).ok_or_else(|| LoadError::InvalidValue {
                line,
                column: column.to_string(),
                value: cell(idx).to_string(),
            })
        };

        let pump_on = parse_pump_flag(cell(cols.pump)).ok_or_else(|| LoadError::InvalidValue {
            line,
            column: COL_PUMP.to_string(),
            value: cell(cols.pump).to_string(),
        })?;

        observations.push(Observation {
            timestamp,
            depth_cm: number(cols.depth, COL_DEPTH)?,
            flow_m3h: number(cols.flow, COL_FLOW)?,
            energy_kwh: number(cols.energy, COL_ENERGY)?,
            rain_mm: number(cols.rain, COL_RAIN)?,
            pump_on,
        });
    }

    logging::log_load_summary(source, rows_read, observations.len(), rows_dropped);

    let series = TimeSeries::new(observations).map_err(|_| LoadError::Empty)?;
    Ok(CsvLoad {
        series,
        rows_read,
        rows_dropped,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
