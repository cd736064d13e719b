//! Headline usage metrics for a sensor.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::models::{KeyMetrics, LocalizedReading};

// ---

/// Liters per person per day used for the beneficiary estimate.
pub const LITERS_PER_PERSON_PER_DAY: f64 = 15.0;

/// Calendar days subtracted from the latest date to open the trailing window.
pub const TRAILING_WINDOW_DAYS: u64 = 7;

/// Compute [`KeyMetrics`] over localized readings.
///
/// "Recent day" is the latest local date present. The trailing window holds
/// every reading dated on or after that date minus seven calendar days; gaps
/// in the data do not widen it. Any metric whose window has no liters values
/// is `None`.
pub fn calculate_key_metrics(readings: &[LocalizedReading]) -> KeyMetrics {
    // ---
    let Some(latest) = readings.iter().map(|r| r.date).max() else {
        return KeyMetrics::default();
    };
    let window_start = latest
        .checked_sub_days(Days::new(TRAILING_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);

    let recent_day: Vec<&LocalizedReading> =
        readings.iter().filter(|r| r.date == latest).collect();
    let trailing: Vec<&LocalizedReading> =
        readings.iter().filter(|r| r.date >= window_start).collect();

    let avg_day_7d = mean_of_daily_totals(&trailing);

    KeyMetrics {
        avg_liters_hour_recent_day: mean_of_hourly_means(&recent_day).map(round_half_even),
        avg_liters_hour_7d: mean_of_hourly_means(&trailing).map(round_half_even),
        avg_liters_day_7d: avg_day_7d.map(round_half_even),
        estimated_beneficiaries: avg_day_7d
            .map(|liters| round_half_even(liters / LITERS_PER_PERSON_PER_DAY)),
    }
}

/// Mean liters per local hour. Hours with no liters values are left out.
pub fn hourly_means<'a, I>(readings: I) -> BTreeMap<u32, f64>
where
    I: IntoIterator<Item = &'a LocalizedReading>,
{
    // ---
    let mut by_hour: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for r in readings {
        if let Some(liters) = r.reading.liters {
            let slot = by_hour.entry(r.hour).or_insert((0.0, 0));
            slot.0 += liters;
            slot.1 += 1;
        }
    }
    by_hour
        .into_iter()
        .map(|(hour, (sum, n))| (hour, sum / n as f64))
        .collect()
}

/// Total liters per local date.
///
/// A date with readings but no liters values still counts, with a total of 0.
pub fn daily_totals<'a, I>(readings: I) -> BTreeMap<NaiveDate, f64>
where
    I: IntoIterator<Item = &'a LocalizedReading>,
{
    // ---
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in readings {
        *by_date.entry(r.date).or_insert(0.0) += r.reading.liters.unwrap_or(0.0);
    }
    by_date
}

/// Average liters within each local hour, then average those hourly means.
pub fn mean_of_hourly_means(readings: &[&LocalizedReading]) -> Option<f64> {
    mean(hourly_means(readings.iter().copied()).into_values())
}

/// Sum liters per local date, then average those daily totals.
pub fn mean_of_daily_totals(readings: &[&LocalizedReading]) -> Option<f64> {
    mean(daily_totals(readings.iter().copied()).into_values())
}

fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Round to the nearest integer, halves to even.
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}
