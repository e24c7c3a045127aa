//! Operational KPIs over a window of the series.
//!
//! `summarize` is the aggregator behind the dashboard tiles. It is safe to
//! call on any filtered view since it has no cross-window dependency; the
//! only window it derives itself is the trailing rainfall window, anchored
//! on the view's own latest timestamp.

use crate::model::{KpiSnapshot, Observation, TimeSeries};

/// Span of the rainfall total reported with the KPIs.
pub const KPI_RAIN_WINDOW_HOURS: u32 = 24;

// ---------------------------------------------------------------------------
// Accumulators
// ---------------------------------------------------------------------------

/// Running sums over a set of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub rows: usize,
    pub pump_rows: usize,
    pub depth_cm: f64,
    pub energy_kwh: f64,
    /// Sum of hourly flow rates. With hourly sampling this is the pumped
    /// volume in m³.
    pub volume_m3: f64,
    pub rain_mm: f64,
}

impl Totals {
    fn add(mut self, obs: &Observation) -> Self {
        self.rows += 1;
        self.pump_rows += usize::from(obs.pump_on);
        self.depth_cm += obs.depth_cm;
        self.energy_kwh += obs.energy_kwh;
        self.volume_m3 += obs.flow_m3h;
        self.rain_mm += obs.rain_mm;
        self
    }

    /// Energy per pumped volume for these rows, if any water was pumped.
    pub fn efficiency(&self) -> Option<f64> {
        efficiency(self.energy_kwh, self.volume_m3)
    }
}

/// Sums every field over `rows` in a single pass.
pub fn totals<'a, I>(rows: I) -> Totals
where
    I: IntoIterator<Item = &'a Observation>,
{
    rows.into_iter().fold(Totals::default(), Totals::add)
}

/// kWh per m³, or `None` when the volume is not positive.
///
/// Zero volume means "no data", not "perfect efficiency", so no sentinel is
/// ever returned in its place.
pub fn efficiency(energy_kwh: f64, volume_m3: f64) -> Option<f64> {
    (volume_m3 > 0.0).then(|| energy_kwh / volume_m3)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Computes the KPI snapshot of a (possibly pre-filtered) series.
pub fn summarize(series: &TimeSeries) -> KpiSnapshot {
    let all = totals(series);
    let rain = totals(series.trailing(KPI_RAIN_WINDOW_HOURS));

    let snapshot = KpiSnapshot {
        // `TimeSeries` is never empty, so `rows >= 1`.
        mean_depth_cm: all.depth_cm / all.rows as f64,
        total_energy_kwh: all.energy_kwh,
        total_volume_m3: all.volume_m3,
        efficiency_kwh_per_m3: all.efficiency(),
        pump_hours: all.pump_rows,
        rain_24h_mm: rain.rain_mm,
    };

    tracing::debug!(
        component = %crate::logging::Component::Kpi,
        rows = all.rows,
        pump_hours = snapshot.pump_hours,
        efficiency = ?snapshot.efficiency_kwh_per_m3,
        "KPI snapshot computed"
    );

    snapshot
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
