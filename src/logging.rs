//! Structured logging for the irrigation decision-support service.
//!
//! Events are emitted through `tracing` and carry a `component` field naming
//! the part of the pipeline that produced them. The core aggregation and rule
//! functions only emit `debug` events; summaries at `info` and above come
//! from the loaders and the binary.

use std::fmt;

use tracing_subscriber::EnvFilter;

use crate::model::{Recommendation, Severity};

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Loader,
    Synthetic,
    Kpi,
    Rules,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Loader => write!(f, "loader"),
            Component::Synthetic => write!(f, "synthetic"),
            Component::Kpi => write!(f, "kpi"),
            Component::Rules => write!(f, "rules"),
            Component::System => write!(f, "system"),
        }
    }
}

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this twice is
/// harmless: the second installation attempt is ignored.
pub fn init(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| EnvFilter::try_new(default_level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let result = if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(component = %Component::System, json, "logging initialised");
    }
}

// ---------------------------------------------------------------------------
// Summary logging
// ---------------------------------------------------------------------------

/// Level a load summary should be reported at.
pub fn load_summary_level(kept: usize, dropped: usize) -> tracing::Level {
    if dropped == 0 {
        tracing::Level::INFO
    } else if kept == 0 {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    }
}

/// Logs how many rows of a source survived timestamp parsing.
pub fn log_load_summary(source: &str, total: usize, kept: usize, dropped: usize) {
    let component = Component::Loader;
    let level = load_summary_level(kept, dropped);
    if level == tracing::Level::INFO {
        tracing::info!(%component, source, total, kept, "load complete: {}/{} rows kept", kept, total);
    } else if level == tracing::Level::ERROR {
        tracing::error!(
            %component, source, total, dropped,
            "load failed: all {} rows had unparseable timestamps", total
        );
    } else {
        tracing::warn!(
            %component, source, total, kept, dropped,
            "load complete: {}/{} rows kept, {} dropped (unparseable timestamp)", kept, total, dropped
        );
    }
}

/// Logs a recommendation at the level matching its severity.
pub fn log_recommendation(rec: &Recommendation) {
    let component = Component::Rules;
    let fired: Vec<String> = rec.fired.iter().map(ToString::to_string).collect();
    let fired = fired.join(", ");
    match rec.severity {
        Severity::Error => tracing::error!(%component, severity = %rec.severity, %fired, "recommendation issued"),
        Severity::Warning => tracing::warn!(%component, severity = %rec.severity, %fired, "recommendation issued"),
        Severity::Info | Severity::Success => {
            tracing::info!(%component, severity = %rec.severity, "recommendation issued")
        }
    }
}
