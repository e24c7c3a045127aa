//! Irrigation dashboard, command-line edition.
//!
//! Loads the telemetry CSV (or generates a synthetic series when it is
//! missing), prints the KPI tiles for the selected period and the
//! recommendation computed over the full history.
//!
//! # Usage
//!
//! ```bash
//! agro_irrigation --period 24h
//! agro_irrigation --data data/dados_irrigacao.csv --json
//! ```
//!
//! # Environment Variables
//!
//! - `AGRO_CONFIG`: configuration file (default: agro_irrigation.toml)
//! - `AGRO_DATA_CSV`: telemetry CSV path
//! - `AGRO_PERIOD`: display period (24h, 3d, 7d, all)
//! - `RUST_LOG`: logging filter (overrides the configured level)

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, Timelike};
use clap::Parser;
use std::path::PathBuf;

use agro_irrigation::config::{self, ConfigSource, DEFAULT_CONFIG_PATH};
use agro_irrigation::ingest;
use agro_irrigation::logging::{self, Component};
use agro_irrigation::model::DisplayPeriod;
use agro_irrigation::report::DashboardReport;

#[derive(Parser, Debug)]
#[command(name = "agro_irrigation")]
#[command(about = "Irrigation KPIs and rule-based recommendations")]
#[command(version)]
struct CliArgs {
    /// Configuration file; defaults are used when the default path is absent
    #[arg(short, long, env = "AGRO_CONFIG")]
    config: Option<PathBuf>,

    /// Telemetry CSV (a synthetic series is generated if it does not exist)
    #[arg(short, long, env = "AGRO_DATA_CSV")]
    data: Option<PathBuf>,

    /// Display period for the KPI tiles: 24h, 3d, 7d or all
    #[arg(short, long, env = "AGRO_PERIOD")]
    period: Option<DisplayPeriod>,

    /// Seed of the synthetic series
    #[arg(long)]
    seed: Option<u64>,

    /// Length of the synthetic series, in hours
    #[arg(long)]
    hours: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

/// Current local time truncated to the hour: the end of a synthetic series.
fn current_hour() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = CliArgs::parse();

    let (mut cfg, config_source) = match &args.config {
        Some(path) => (
            config::load_config(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            ConfigSource::File(path.clone()),
        ),
        None => config::load_or_default(std::path::Path::new(DEFAULT_CONFIG_PATH))
            .context("loading default configuration")?,
    };

    if let Some(path) = args.data {
        cfg.data.csv_path = path;
    }
    if let Some(period) = args.period {
        cfg.display.period = period;
    }
    if let Some(seed) = args.seed {
        cfg.data.seed = seed;
    }
    if let Some(hours) = args.hours {
        cfg.data.synthetic_hours = hours;
    }
    if let Some(level) = args.log_level {
        cfg.logging.level = level;
    }
    cfg.validate().context("invalid configuration")?;

    logging::init(&cfg.logging.level, cfg.logging.json);
    tracing::info!(
        component = %Component::System,
        source = %config_source,
        period = %cfg.display.period,
        "configuration loaded"
    );

    let (series, origin) = ingest::load_or_generate(&cfg.data, current_hour())
        .context("loading telemetry")?;
    tracing::info!(
        component = %Component::System,
        rows = series.len(),
        first = %series.earliest_timestamp(),
        last = %series.latest_timestamp(),
        "telemetry ready"
    );

    let report = DashboardReport::build(&series, cfg.display.period, origin, &cfg.rules);
    logging::log_recommendation(&report.recommendation);

    if args.json {
        println!("{}", report.to_json().context("serialising report")?);
    } else {
        print!("{}", report);
    }

    Ok(())
}
