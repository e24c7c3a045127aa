//! Dashboard report: the hand-off point to the presentation layer.
//!
//! KPIs are computed on the display-filtered rows; the recommendation is
//! always computed on the full history.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use crate::alert::recommendation::evaluate_with;
use crate::alert::thresholds::RuleThresholds;
use crate::analysis::kpis::summarize;
use crate::ingest::DataOrigin;
use crate::model::{DisplayPeriod, KpiSnapshot, Recommendation, TimeSeries};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub period: DisplayPeriod,
    pub origin: DataOrigin,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    /// Rows inside the display period.
    pub rows: usize,
    pub kpis: KpiSnapshot,
    pub recommendation: Recommendation,
}

impl DashboardReport {
    /// Builds the report for one dashboard refresh.
    pub fn build(
        series: &TimeSeries,
        period: DisplayPeriod,
        origin: DataOrigin,
        thresholds: &RuleThresholds,
    ) -> Self {
        let view = series.filtered(period);
        Self {
            period,
            origin,
            window_start: view.earliest_timestamp(),
            window_end: view.latest_timestamp(),
            rows: view.len(),
            kpis: summarize(&view),
            recommendation: evaluate_with(series, thresholds),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let k = &self.kpis;
        writeln!(f, "Irrigation dashboard ({}, source: {})", self.period.label(), self.origin)?;
        writeln!(
            f,
            "Window: {} .. {} ({} rows)",
            self.window_start.format("%Y-%m-%d %H:%M"),
            self.window_end.format("%Y-%m-%d %H:%M"),
            self.rows
        )?;
        writeln!(f)?;
        writeln!(f, "  Mean water depth (cm)    {:>10.2}", k.mean_depth_cm)?;
        writeln!(f, "  Total energy (kWh)       {:>10.1}", k.total_energy_kwh)?;
        writeln!(f, "  Total volume (m³)        {:>10.1}", k.total_volume_m3)?;
        // Display only: an absent efficiency is shown as zero.
        writeln!(
            f,
            "  Efficiency (kWh/m³)      {:>10.3}",
            k.efficiency_kwh_per_m3.unwrap_or(0.0)
        )?;
        writeln!(f, "  Pump-on hours            {:>8} h", k.pump_hours)?;
        writeln!(f, "  Rain, last 24h (mm)      {:>10.1}", k.rain_24h_mm)?;
        writeln!(f)?;
        writeln!(f, "Recommendation [{}]", self.recommendation.severity)?;
        for message in &self.recommendation.messages {
            writeln!(f, "- {}", message)?;
        }
        Ok(())
    }
}
