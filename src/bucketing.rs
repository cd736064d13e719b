//! Local-calendar bucketing.
//!
//! All downstream grouping (dates, hours, seasons) uses the sensor's local
//! wall clock, never UTC: a reading at 22:00 UTC in Nairobi belongs to the
//! next local day.

use chrono::{Datelike, Timelike};
use chrono_tz::Tz;

use crate::models::{LocalizedReading, Reading, Season};

// ---

/// Place one reading on the local calendar of `tz`.
pub fn localize(reading: &Reading, tz: Tz) -> LocalizedReading {
    // ---
    let local_timestamp = reading.timestamp_utc.with_timezone(&tz);
    let date = local_timestamp.date_naive();
    let month = local_timestamp.month();

    LocalizedReading {
        reading: reading.clone(),
        local_timestamp,
        date,
        month,
        hour: local_timestamp.hour(),
        season: Season::from_month(month),
    }
}

/// Localize a whole dataset, preserving input order.
pub fn localize_all(readings: &[Reading], tz: Tz) -> Vec<LocalizedReading> {
    readings.iter().map(|r| localize(r, tz)).collect()
}
