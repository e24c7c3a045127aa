//! Rolling windows over a `TimeSeries`.
//!
//! # Clock injection
//! Every window is anchored on `series.latest_timestamp()`, never on the wall
//! clock. The same series therefore always yields the same windows, which
//! keeps the aggregation and rule evaluation deterministic in tests.

use chrono::{Duration, NaiveDateTime};

use crate::model::{DisplayPeriod, Observation, TimeSeries};

// ---------------------------------------------------------------------------
// Trailing windows
// ---------------------------------------------------------------------------

/// Start of a window of `hours` ending at `now`.
///
/// Rows with `timestamp >= window_start(now, hours)` belong to the window,
/// so a row exactly `hours` old is included. A span reaching past the
/// earliest representable timestamp starts at `NaiveDateTime::MIN`, so the
/// window then covers the whole series.
pub fn window_start(now: NaiveDateTime, hours: u32) -> NaiveDateTime {
    now.checked_sub_signed(Duration::hours(i64::from(hours)))
        .unwrap_or(NaiveDateTime::MIN)
}

impl TimeSeries {
    /// Rows whose timestamp lies within `hours` of the latest timestamp.
    ///
    /// Because the series is sorted this is a suffix of the rows, located by
    /// binary search. It always contains at least the latest row.
    pub fn trailing(&self, hours: u32) -> &[Observation] {
        let cutoff = window_start(self.latest_timestamp(), hours);
        let rows = self.as_slice();
        let start = rows.partition_point(|o| o.timestamp < cutoff);
        &rows[start..]
    }

    /// Independent copy of the rows inside a dashboard display period.
    ///
    /// The source series is left untouched.
    pub fn filtered(&self, period: DisplayPeriod) -> TimeSeries {
        let rows = match period.hours() {
            Some(hours) => self.trailing(hours),
            None => self.as_slice(),
        };
        // A trailing window always holds the latest row, so it is non-empty.
        TimeSeries::new(rows.to_vec()).unwrap_or_else(|_| self.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
