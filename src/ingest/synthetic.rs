//! Synthetic irrigation telemetry.
//!
//! Used when no telemetry file is available so the dashboard and the rule
//! engine always have data to work on. The series is a rough physical
//! caricature of a flooded paddy: intermittent pumping, a few rain events,
//! and a water sheet that rises with inflow and rain and slowly drains.
//!
//! # Clock injection
//! The last timestamp is passed in (`SyntheticParams::end`) rather than read
//! from the clock, and the RNG is seeded, so the same parameters always
//! produce the same series.

use chrono::{Duration, NaiveDateTime};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::logging::Component;
use crate::model::{Observation, SyntheticError, TimeSeries};

// ---------------------------------------------------------------------------
// Generation constants
// ---------------------------------------------------------------------------

/// Longest series the generator produces: ten years of hourly rows.
pub const MAX_HOURS: usize = 24 * 3660;

/// Number of rain events scattered over the series.
const RAIN_EVENTS: usize = 10;
/// Rain event duration range, hours (upper bound exclusive).
const RAIN_DURATION_HOURS: std::ops::Range<usize> = 2..8;
/// Rain intensity range, mm/h.
const RAIN_INTENSITY_MM: std::ops::Range<f64> = 1.0..6.0;
/// A uniform draw above this turns the pump on (≈65% duty cycle).
const PUMP_OFF_PROBABILITY: f64 = 0.35;

/// Flow when pumping / idle: mean and standard deviation, m³/h.
const FLOW_ON: (f64, f64) = (75.0, 12.0);
const FLOW_OFF: (f64, f64) = (5.0, 2.0);
/// Energy when pumping / idle: mean and standard deviation, kWh.
const ENERGY_ON: (f64, f64) = (55.0, 10.0);
const ENERGY_OFF: (f64, f64) = (2.0, 1.0);

/// Initial water-sheet depth, cm.
const INITIAL_DEPTH_CM: f64 = 7.5;
/// Flow (m³/h) that raises the sheet by 1 cm.
const FLOW_PER_CM: f64 = 1200.0;
/// Rain (mm) that raises the sheet by 1 cm.
const RAIN_MM_PER_CM: f64 = 20.0;
/// Hourly evaporation/seepage loss: mean and standard deviation, cm.
const LOSS_CM: (f64, f64) = (0.02, 0.03);
/// Physical bounds of the simulated sheet, cm.
const DEPTH_BOUNDS_CM: (f64, f64) = (4.5, 12.0);

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticParams {
    /// Number of hourly rows.
    pub hours: usize,
    /// RNG seed.
    pub seed: u64,
    /// Timestamp of the last row.
    pub end: NaiveDateTime,
}

impl SyntheticParams {
    /// Ten days of hourly data ending at `end`, seed 42.
    pub fn new(end: NaiveDateTime) -> Self {
        Self {
            hours: 240,
            seed: 42,
            end,
        }
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

fn normal((mean, std_dev): (f64, f64)) -> Result<Normal<f64>, SyntheticError> {
    Ok(Normal::new(mean, std_dev)?)
}

/// Generates a synthetic hourly series.
///
/// Returns `SeriesError::Empty` (wrapped) when `params.hours` is zero and
/// `SyntheticError::OutOfRange` when the series is longer than `MAX_HOURS`
/// or would start before the earliest representable timestamp.
pub fn generate(params: &SyntheticParams) -> Result<TimeSeries, SyntheticError> {
    let n = params.hours;
    let fits = n <= MAX_HOURS
        && params
            .end
            .checked_sub_signed(Duration::hours(n.saturating_sub(1) as i64))
            .is_some();
    if !fits {
        return Err(SyntheticError::OutOfRange {
            hours: n,
            end: params.end,
        });
    }
    let mut rng = StdRng::seed_from_u64(params.seed);

    // Rain events: overlapping events add up.
    let mut rain = vec![0.0_f64; n];
    if n > 0 {
        for _ in 0..RAIN_EVENTS {
            let start = rng.gen_range(0..n);
            let duration = rng.gen_range(RAIN_DURATION_HOURS);
            let intensity = rng.gen_range(RAIN_INTENSITY_MM);
            for hour in rain.iter_mut().skip(start).take(duration) {
                *hour += intensity;
            }
        }
    }

    let (flow_on, flow_off) = (normal(FLOW_ON)?, normal(FLOW_OFF)?);
    let (energy_on, energy_off) = (normal(ENERGY_ON)?, normal(ENERGY_OFF)?);
    let loss = normal(LOSS_CM)?;

    let pump: Vec<bool> = (0..n)
        .map(|_| rng.gen_range(0.0..1.0) > PUMP_OFF_PROBABILITY)
        .collect();
    let flow: Vec<f64> = pump
        .iter()
        .map(|&on| {
            let dist = if on { &flow_on } else { &flow_off };
            dist.sample(&mut rng).max(0.0)
        })
        .collect();
    let energy: Vec<f64> = pump
        .iter()
        .map(|&on| {
            let dist = if on { &energy_on } else { &energy_off };
            dist.sample(&mut rng).max(0.0)
        })
        .collect();

    // The sheet evolves unclipped; bounds are applied once afterwards.
    let mut depth = vec![INITIAL_DEPTH_CM; n];
    for i in 1..n {
        depth[i] = depth[i - 1] + flow[i] / FLOW_PER_CM + rain[i] / RAIN_MM_PER_CM
            - loss.sample(&mut rng);
    }

    let observations: Vec<Observation> = (0..n)
        .map(|i| Observation {
            timestamp: params.end - Duration::hours((n - 1 - i) as i64),
            depth_cm: depth[i].clamp(DEPTH_BOUNDS_CM.0, DEPTH_BOUNDS_CM.1),
            flow_m3h: flow[i],
            energy_kwh: energy[i],
            rain_mm: rain[i],
            pump_on: pump[i],
        })
        .collect();

    let series = TimeSeries::new(observations)?;
    tracing::info!(
        component = %Component::Synthetic,
        rows = series.len(),
        seed = params.seed,
        end = %params.end,
        "generated synthetic series"
    );
    Ok(series)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
