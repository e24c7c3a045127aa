//! Service configuration loaded from a TOML file.
//!
//! Every table is optional and falls back to its defaults, so a missing or
//! empty file yields a working configuration. Example:
//!
//! ```toml
//! [data]
//! csv_path = "data/dados_irrigacao.csv"
//! synthetic_hours = 240
//! seed = 42
//!
//! [display]
//! period = "7d"
//!
//! [rules]
//! rain_hold_mm = 10.0
//! high_depth_cm = 9.5
//! low_depth_cm = 6.0
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::alert::thresholds::RuleThresholds;
use crate::ingest::synthetic;
use crate::model::DisplayPeriod;

/// Default location of the configuration file, relative to the working dir.
pub const DEFAULT_CONFIG_PATH: &str = "agro_irrigation.toml";

/// Default location of the telemetry CSV.
pub const DEFAULT_CSV_PATH: &str = "data/dados_irrigacao.csv";

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub display: DisplayConfig,
    pub rules: RuleThresholds,
    pub logging: LoggingConfig,
}

/// Where the telemetry comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV read when it exists; otherwise a synthetic series is generated.
    pub csv_path: PathBuf,
    /// Length of the synthetic series, in hourly rows.
    pub synthetic_hours: usize,
    /// RNG seed of the synthetic series.
    pub seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            synthetic_hours: 240,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub period: DisplayPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate().map_err(ConfigError::Invalid)?;
        if !(1..=synthetic::MAX_HOURS).contains(&self.data.synthetic_hours) {
            return Err(ConfigError::Invalid(format!(
                "data.synthetic_hours must be between 1 and {}, got {}",
                synthetic::MAX_HOURS,
                self.data.synthetic_hours
            )));
        }
        Ok(())
    }
}

/// Parses and validates a configuration document.
pub fn parse_config(text: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Loads the configuration file at `path`. The file must exist.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&text)
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Loads `path` when it exists, otherwise returns the defaults.
///
/// Nothing is logged here: the caller usually loads the configuration
/// before the subscriber exists, and reports the returned source once
/// logging is up.
pub fn load_or_default(path: &Path) -> Result<(AppConfig, ConfigSource), ConfigError> {
    if path.exists() {
        Ok((load_config(path)?, ConfigSource::File(path.to_path_buf())))
    } else {
        Ok((AppConfig::default(), ConfigSource::Defaults))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = parse_config("").expect("empty config is valid");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.data.csv_path, PathBuf::from(DEFAULT_CSV_PATH));
        assert_eq!(config.data.synthetic_hours, 240);
        assert_eq!(config.data.seed, 42);
        assert_eq!(config.display.period, DisplayPeriod::Last7Days);
    }

    #[test]
    fn test_full_document_overrides_every_section() {
        let config = parse_config(
            r#"
            [data]
            csv_path = "/srv/farm/telemetry.csv"
            synthetic_hours = 72
            seed = 7

            [display]
            period = "24h"

            [rules]
            rain_hold_mm = 15.0
            baseline_min_pump_rows = 24

            [logging]
            level = "debug"
            json = true
            "#,
        )
        .expect("valid config");

        assert_eq!(config.data.csv_path, PathBuf::from("/srv/farm/telemetry.csv"));
        assert_eq!(config.data.synthetic_hours, 72);
        assert_eq!(config.data.seed, 7);
        assert_eq!(config.display.period, DisplayPeriod::Last24h);
        assert_eq!(config.rules.rain_hold_mm, 15.0);
        assert_eq!(config.rules.baseline_min_pump_rows, 24);
        assert_eq!(config.rules.high_depth_cm, 9.5, "unset rule keeps its default");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_unknown_period_is_a_parse_error() {
        let result = parse_config("[display]\nperiod = \"fortnight\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))), "got {:?}", result);
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        let result = parse_config("[rules]\nlow_depth_cm = 10.0\nhigh_depth_cm = 9.0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))), "got {:?}", result);
    }

    #[test]
    fn test_zero_synthetic_hours_is_rejected() {
        let result = parse_config("[data]\nsynthetic_hours = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\nperiod = \"all\"").unwrap();
        let config = load_config(file.path()).expect("file should load");
        assert_eq!(config.display.period, DisplayPeriod::All);
    }

    #[test]
    fn test_load_config_missing_file_is_io_error() {
        let result = load_config(Path::new("/nonexistent/agro_irrigation.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_or_default_tolerates_missing_file() {
        let (config, source) = load_or_default(Path::new("/nonexistent/agro_irrigation.toml"))
            .expect("missing file falls back to defaults");
        assert_eq!(config, AppConfig::default());
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(source.to_string(), "built-in defaults");
    }

    #[test]
    fn test_load_or_default_reports_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[data]\nseed = 9").unwrap();
        let (config, source) = load_or_default(file.path()).expect("file should load");
        assert_eq!(config.data.seed, 9);
        assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_oversized_synthetic_hours_is_rejected() {
        let text = format!("[data]\nsynthetic_hours = {}", synthetic::MAX_HOURS + 1);
        let result = parse_config(&text);
        assert!(matches!(result, Err(ConfigError::Invalid(_))), "got {:?}", result);
        let text = format!("[data]\nsynthetic_hours = {}", synthetic::MAX_HOURS);
        assert!(parse_config(&text).is_ok());
    }

    #[test]
    fn test_oversized_rule_windows_are_accepted() {
        let config = parse_config("[rules]\nrain_window_hours = 4000000000")
            .expect("long windows only widen to the whole series");
        assert_eq!(config.rules.rain_window_hours, 4_000_000_000);
    }
}
