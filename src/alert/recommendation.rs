//! Rule-based irrigation recommendations.
//!
//! Turns the full telemetry history into a severity level plus an ordered
//! list of human-readable messages. Four threshold rules are evaluated in a
//! fixed order and every rule that matches contributes its message; when
//! none matches a single "within norms" message is returned instead.
//!
//! The evaluator must receive the complete history, not a dashboard-filtered
//! view: its windows and its baseline are computed relative to the series'
//! own latest timestamp, and the baseline needs more than
//! `baseline_min_pump_rows` pump-on hours to exist at all.

use crate::alert::thresholds::RuleThresholds;
use crate::analysis::kpis::totals;
use crate::logging::Component;
use crate::model::{Recommendation, Rule, RuleInputs, Severity, TimeSeries};

/// Horizon over which the rain-hold message advises deferring pumping, hours.
const RAIN_HOLD_HORIZON_HOURS: u32 = 6;

/// Historical energy per volume over every pump-on row.
///
/// `None` unless strictly more than `min_pump_rows` rows have the pump on
/// and those rows pumped a positive volume.
pub fn baseline_efficiency(series: &TimeSeries, min_pump_rows: usize) -> Option<f64> {
    let pumping = totals(series.iter().filter(|o| o.pump_on));
    if pumping.rows > min_pump_rows {
        pumping.efficiency()
    } else {
        None
    }
}

/// Evaluates the rules with the reference thresholds.
pub fn evaluate(series: &TimeSeries) -> Recommendation {
    evaluate_with(series, &RuleThresholds::default())
}

/// Evaluates the rules against `series` using `thresholds`.
///
/// Pure and deterministic: no wall clock, no shared state, no mutation.
pub fn evaluate_with(series: &TimeSeries, thresholds: &RuleThresholds) -> Recommendation {
    let inputs = RuleInputs {
        rain_24h_mm: totals(series.trailing(thresholds.rain_window_hours)).rain_mm,
        current_depth_cm: series.latest().depth_cm,
        recent_efficiency: totals(series.trailing(thresholds.recent_window_hours)).efficiency(),
        baseline_efficiency: baseline_efficiency(series, thresholds.baseline_min_pump_rows),
    };

    let mut severity = Severity::Info;
    let mut messages = Vec::new();
    let mut fired = Vec::new();

    // 1) Significant recent rain: hold pumping.
    if inputs.rain_24h_mm >= thresholds.rain_hold_mm {
        messages.push(format!(
            "Suggestion: reduce or defer pumping over the next {}h (rainfall in the last {}h: {:.1} mm).",
            RAIN_HOLD_HORIZON_HOURS, thresholds.rain_window_hours, inputs.rain_24h_mm
        ));
        fired.push(Rule::RainfallHold);
        severity = severity.max(Severity::Warning);
    }

    // 2) High water sheet: cut irrigation.
    if inputs.current_depth_cm >= thresholds.high_depth_cm {
        messages.push(format!(
            "Attention: water sheet is high ({:.1} cm). Consider reducing pump time to avoid excess.",
            inputs.current_depth_cm
        ));
        fired.push(Rule::HighDepth);
        severity = severity.max(Severity::Warning);
    }

    // 3) Low water sheet: replenish first. Most severe rule.
    if inputs.current_depth_cm <= thresholds.low_depth_cm {
        messages.push(format!(
            "Action required: water sheet is low ({:.1} cm). Prioritize replenishment and check for losses or inflow problems.",
            inputs.current_depth_cm
        ));
        fired.push(Rule::LowDepth);
        severity = Severity::Error;
    }

    // 4) Recent energy per m³ well above the historical baseline.
    if let (Some(recent), Some(baseline)) = (inputs.recent_efficiency, inputs.baseline_efficiency) {
        if recent > baseline * thresholds.efficiency_tolerance {
            messages.push(format!(
                "Alert: energy efficiency below expected. Last {}h = {:.3} kWh/m³ vs baseline = {:.3} kWh/m³. \
                 Check for obstructions, suction, discharge line, valves or operating conditions.",
                thresholds.recent_window_hours, recent, baseline
            ));
            fired.push(Rule::EfficiencyDegradation);
            severity = severity.max(Severity::Warning);
        }
    }

    if fired.is_empty() {
        messages.push(
            "Operation within observed norms. Keep monitoring and review again in a few hours."
                .to_string(),
        );
        severity = Severity::Success;
    }

    tracing::debug!(
        component = %Component::Rules,
        severity = %severity,
        fired = fired.len(),
        rain_24h_mm = inputs.rain_24h_mm,
        current_depth_cm = inputs.current_depth_cm,
        recent_efficiency = ?inputs.recent_efficiency,
        baseline_efficiency = ?inputs.baseline_efficiency,
        "rules evaluated"
    );

    Recommendation {
        severity,
        messages,
        fired,
        inputs,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Observation;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    /// 48 quiet hourly rows: pump on every hour at 0.7 kWh/m³, no rain,
    /// depth 7.5 cm. No rule fires on this series.
    fn calm_rows() -> Vec<Observation> {
        (0..48)
            .map(|i| Observation {
                timestamp: fixed_now() - Duration::hours(47 - i),
                depth_cm: 7.5,
                flow_m3h: 100.0,
                energy_kwh: 70.0,
                rain_mm: 0.0,
                pump_on: true,
            })
            .collect()
    }

    fn with_last_depth(mut rows: Vec<Observation>, depth: f64) -> TimeSeries {
        if let Some(last) = rows.last_mut() {
            last.depth_cm = depth;
        }
        TimeSeries::new(rows).unwrap()
    }

    // --- Fallback -----------------------------------------------------------

    #[test]
    fn test_calm_series_is_success_with_single_message() {
        let rec = evaluate(&TimeSeries::new(calm_rows()).unwrap());
        assert_eq!(rec.severity, Severity::Success);
        assert_eq!(rec.messages.len(), 1);
        assert!(rec.fired.is_empty());
        assert!(rec.messages[0].contains("within observed norms"));
    }

    // --- Rainfall hold ------------------------------------------------------

    #[test]
    fn test_rain_at_threshold_fires_hold() {
        let mut rows = calm_rows();
        rows[47].rain_mm = 4.0;
        rows[40].rain_mm = 6.0;
        let rec = evaluate(&TimeSeries::new(rows).unwrap());
        assert_eq!(rec.fired, vec![Rule::RainfallHold]);
        assert_eq!(rec.severity, Severity::Warning);
        assert!(
            rec.messages[0].contains("10.0 mm"),
            "message should cite the rainfall total: {}",
            rec.messages[0]
        );
    }

    #[test]
    fn test_rain_hold_horizon_ignores_efficiency_window() {
        let mut rows = calm_rows();
        rows[47].rain_mm = 12.0;
        let thresholds = RuleThresholds {
            recent_window_hours: 12,
            ..RuleThresholds::default()
        };
        let rec = evaluate_with(&TimeSeries::new(rows).unwrap(), &thresholds);
        assert!(
            rec.messages[0].contains("over the next 6h"),
            "hold horizon must not follow the efficiency window: {}",
            rec.messages[0]
        );
    }

    #[test]
    fn test_rain_outside_window_is_ignored() {
        let mut rows = calm_rows();
        rows[0].rain_mm = 50.0; // 47 hours before the latest row
        let rec = evaluate(&TimeSeries::new(rows).unwrap());
        assert!(!rec.has_fired(Rule::RainfallHold));
        assert_relative_eq!(rec.inputs.rain_24h_mm, 0.0);
    }

    // --- Depth boundaries ---------------------------------------------------

    #[test]
    fn test_depth_exactly_high_threshold_fires() {
        let rec = evaluate(&with_last_depth(calm_rows(), 9.5));
        assert_eq!(rec.fired, vec![Rule::HighDepth]);
        assert_eq!(rec.severity, Severity::Warning);
        assert!(rec.messages[0].contains("9.5 cm"));
    }

    #[test]
    fn test_depth_just_below_high_threshold_does_not_fire() {
        let rec = evaluate(&with_last_depth(calm_rows(), 9.49));
        assert_eq!(rec.severity, Severity::Success);
    }

    #[test]
    fn test_depth_exactly_low_threshold_is_error() {
        let rec = evaluate(&with_last_depth(calm_rows(), 6.0));
        assert_eq!(rec.fired, vec![Rule::LowDepth]);
        assert_eq!(rec.severity, Severity::Error);
        assert!(rec.messages[0].contains("6.0 cm"));
    }

    #[test]
    fn test_only_latest_row_defines_current_depth() {
        let mut rows = calm_rows();
        for row in rows.iter_mut().take(47) {
            row.depth_cm = 4.5;
        }
        let rec = evaluate(&TimeSeries::new(rows).unwrap());
        assert_relative_eq!(rec.inputs.current_depth_cm, 7.5);
        assert!(!rec.has_fired(Rule::LowDepth));
    }

    // --- Efficiency ---------------------------------------------------------

    #[test]
    fn test_degraded_recent_efficiency_fires() {
        // Last 7 rows (6h window, inclusive) burn 1.0 kWh/m³ against a
        // history mostly at 0.7.
        let mut rows = calm_rows();
        for row in rows.iter_mut().skip(41) {
            row.energy_kwh = 100.0;
        }
        let rec = evaluate(&TimeSeries::new(rows).unwrap());
        assert_eq!(rec.fired, vec![Rule::EfficiencyDegradation]);
        assert_eq!(rec.severity, Severity::Warning);
        assert_relative_eq!(rec.inputs.recent_efficiency.unwrap(), 1.0);
        assert!(rec.messages[0].contains("1.000 kWh/m³"));
    }

    #[test]
    fn test_efficiency_within_tolerance_does_not_fire() {
        // 0.8 vs a baseline a little above 0.7: below the 15% margin.
        let mut rows = calm_rows();
        for row in rows.iter_mut().skip(41) {
            row.energy_kwh = 80.0;
        }
        let rec = evaluate(&TimeSeries::new(rows).unwrap());
        assert!(!rec.has_fired(Rule::EfficiencyDegradation));
    }

    #[test]
    fn test_efficiency_exactly_at_tolerance_does_not_fire() {
        // Pump-on history at 0.5 kWh/m³. The last 7 rows are pump-off (so
        // they stay out of the baseline) but still count for the recent
        // window, at exactly 0.75 = 0.5 * 1.5.
        let mut rows = calm_rows();
        for row in rows.iter_mut().take(41) {
            row.energy_kwh = 50.0;
        }
        for row in rows.iter_mut().skip(41) {
            row.pump_on = false;
            row.energy_kwh = 75.0;
        }
        let thresholds = RuleThresholds {
            efficiency_tolerance: 1.5,
            ..RuleThresholds::default()
        };

        let rec = evaluate_with(&TimeSeries::new(rows.clone()).unwrap(), &thresholds);
        assert_eq!(rec.inputs.baseline_efficiency, Some(0.5));
        assert_eq!(rec.inputs.recent_efficiency, Some(0.75));
        assert!(
            !rec.has_fired(Rule::EfficiencyDegradation),
            "recent == baseline * tolerance is not a degradation"
        );

        rows[47].energy_kwh = 76.0;
        let rec = evaluate_with(&TimeSeries::new(rows).unwrap(), &thresholds);
        assert!(rec.inputs.recent_efficiency.unwrap() > 0.75);
        assert_eq!(rec.fired, vec![Rule::EfficiencyDegradation]);
    }

    #[test]
    fn test_oversized_windows_cover_whole_series() {
        let thresholds = RuleThresholds {
            rain_window_hours: u32::MAX,
            recent_window_hours: u32::MAX,
            ..RuleThresholds::default()
        };
        assert!(thresholds.validate().is_ok());
        let mut rows = calm_rows();
        rows[0].rain_mm = 3.0;
        rows[47].rain_mm = 2.0;
        let rec = evaluate_with(&TimeSeries::new(rows).unwrap(), &thresholds);
        assert_relative_eq!(rec.inputs.rain_24h_mm, 5.0);
        assert_relative_eq!(rec.inputs.recent_efficiency.unwrap(), 0.7);
    }

    #[test]
    fn test_no_recent_volume_skips_efficiency_rule() {
        let mut rows = calm_rows();
        for row in rows.iter_mut().skip(41) {
            row.flow_m3h = 0.0;
            row.pump_on = false;
        }
        let rec = evaluate(&TimeSeries::new(rows).unwrap());
        assert_eq!(rec.inputs.recent_efficiency, None);
        assert!(rec.inputs.baseline_efficiency.is_some());
        assert_eq!(rec.severity, Severity::Success);
    }

    #[test]
    fn test_baseline_requires_more_than_ten_pump_rows() {
        let rows: Vec<_> = calm_rows()
            .into_iter()
            .enumerate()
            .map(|(i, mut o)| {
                o.pump_on = i < 10;
                o
            })
            .collect();
        let series = TimeSeries::new(rows.clone()).unwrap();
        assert_eq!(baseline_efficiency(&series, 10), None, "exactly 10 rows is not enough");

        let mut eleven = rows;
        eleven[10].pump_on = true;
        let series = TimeSeries::new(eleven).unwrap();
        assert_relative_eq!(baseline_efficiency(&series, 10).unwrap(), 0.7);
    }

    #[test]
    fn test_baseline_absent_when_pumping_moved_no_water() {
        let rows: Vec<_> = calm_rows()
            .into_iter()
            .map(|mut o| {
                o.flow_m3h = 0.0;
                o
            })
            .collect();
        assert_eq!(baseline_efficiency(&TimeSeries::new(rows).unwrap(), 10), None);
    }

    // --- Aggregation policy -------------------------------------------------

    #[test]
    fn test_low_depth_overrides_later_warning_rules() {
        let mut rows = calm_rows();
        rows[46].rain_mm = 12.0;
        for row in rows.iter_mut().skip(41) {
            row.energy_kwh = 100.0;
        }
        let rec = evaluate(&with_last_depth(rows, 5.2));
        assert_eq!(
            rec.fired,
            vec![Rule::RainfallHold, Rule::LowDepth, Rule::EfficiencyDegradation]
        );
        assert_eq!(
            rec.severity,
            Severity::Error,
            "efficiency warning evaluated after the low-depth rule must not downgrade it"
        );
        assert_eq!(rec.messages.len(), 3);
    }

    #[test]
    fn test_custom_thresholds_are_honoured() {
        let thresholds = RuleThresholds {
            high_depth_cm: 7.5,
            low_depth_cm: 5.0,
            ..RuleThresholds::default()
        };
        let rec = evaluate_with(&TimeSeries::new(calm_rows()).unwrap(), &thresholds);
        assert_eq!(rec.fired, vec![Rule::HighDepth]);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let mut rows = calm_rows();
        rows[45].rain_mm = 11.0;
        let series = with_last_depth(rows, 9.8);
        let first = evaluate(&series);
        for _ in 0..5 {
            assert_eq!(evaluate(&series), first);
        }
    }
}
