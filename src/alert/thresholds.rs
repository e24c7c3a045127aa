//! Decision-rule thresholds.
//!
//! The defaults are the agronomic reference values the rules were tuned
//! with. A deployment may override any of them from the `[rules]` table of
//! the configuration file.

use serde::{Deserialize, Serialize};

/// Tunable constants of the recommendation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// Rainfall over the rain window at or above which pumping is held, mm.
    pub rain_hold_mm: f64,
    /// Depth at or above which the water sheet is considered high, cm.
    pub high_depth_cm: f64,
    /// Depth at or below which the water sheet is considered low, cm.
    pub low_depth_cm: f64,
    /// Recent efficiency must exceed `baseline * efficiency_tolerance` to
    /// count as degraded.
    pub efficiency_tolerance: f64,
    /// The baseline needs strictly more pump-on rows than this.
    pub baseline_min_pump_rows: usize,
    /// Span of the recent-efficiency window, hours.
    pub recent_window_hours: u32,
    /// Span of the rainfall window, hours.
    pub rain_window_hours: u32,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            rain_hold_mm: 10.0,
            high_depth_cm: 9.5,
            low_depth_cm: 6.0,
            efficiency_tolerance: 1.15,
            baseline_min_pump_rows: 10,
            recent_window_hours: 6,
            rain_window_hours: 24,
        }
    }
}

impl RuleThresholds {
    /// Checks that the thresholds describe a usable rule set.
    ///
    /// Comparisons are negated so that NaN values fail validation.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), String> {
        if !(self.low_depth_cm < self.high_depth_cm) {
            return Err(format!(
                "low_depth_cm ({}) must be below high_depth_cm ({})",
                self.low_depth_cm, self.high_depth_cm
            ));
        }
        if !(self.efficiency_tolerance > 0.0) {
            return Err(format!(
                "efficiency_tolerance must be positive, got {}",
                self.efficiency_tolerance
            ));
        }
        if !(self.rain_hold_mm >= 0.0) {
            return Err(format!("rain_hold_mm must be non-negative, got {}", self.rain_hold_mm));
        }
        if self.recent_window_hours == 0 || self.rain_window_hours == 0 {
            return Err("rule windows must span at least one hour".to_string());
        }
        Ok(())
    }
}
