//! Seasonal average daily volume.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{LocalizedReading, Season, SeasonalBucket};

// ---

/// Minimum distinct dates a season needs before it is reported.
pub const COMPLETENESS_THRESHOLD_DAYS: usize = 85;

/// Average daily liters for every season with at least
/// [`COMPLETENESS_THRESHOLD_DAYS`] distinct local dates.
///
/// Daily totals are summed per (season, date); incomplete seasons are left out
/// of the result entirely. Buckets come back in calendar order.
pub fn calculate_seasonal_averages(readings: &[LocalizedReading]) -> Vec<SeasonalBucket> {
    // ---
    let mut daily_totals: BTreeMap<(Season, NaiveDate), f64> = BTreeMap::new();
    for r in readings {
        *daily_totals.entry((r.season, r.date)).or_insert(0.0) += r.reading.liters.unwrap_or(0.0);
    }

    let mut per_season: BTreeMap<Season, (BTreeSet<NaiveDate>, f64)> = BTreeMap::new();
    for ((season, date), total) in daily_totals {
        let entry = per_season.entry(season).or_default();
        entry.0.insert(date);
        entry.1 += total;
    }

    per_season
        .into_iter()
        .filter_map(|(season, (dates, total))| {
            if dates.len() < COMPLETENESS_THRESHOLD_DAYS {
                debug!(
                    "Dropping {} from seasonal averages: {} of {} days",
                    season,
                    dates.len(),
                    COMPLETENESS_THRESHOLD_DAYS
                );
                return None;
            }
            Some(SeasonalBucket {
                season,
                season_label: season.label(),
                avg_daily_volume: total / dates.len() as f64,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::bucketing::localize;
    use crate::models::Reading;
    use chrono::{Duration, TimeZone, Utc};

    /// One reading per day starting at `start`, for `days` days.
    fn daily_readings(start: (i32, u32, u32), days: i64, liters: f64) -> Vec<LocalizedReading> {
        // ---
        let origin = Utc.with_ymd_and_hms(start.0, start.1, start.2, 12, 0, 0).unwrap();
        (0..days)
            .map(|d| {
                let reading = Reading {
                    timestamp_utc: origin + Duration::days(d),
                    latitude: None,
                    longitude: None,
                    liters: Some(liters),
                    temperature: None,
                    red_flag: false,
                    qr_code: None,
                    community_name: None,
                    service_provider: None,
                    water_point_name: None,
                    installation_date: None,
                    model: None,
                };
                localize(&reading, chrono_tz::UTC)
            })
            .collect()
    }

    #[test]
    fn test_exactly_threshold_days_is_retained() {
        // ---
        // Cool Dry (Jun-Aug) has 92 days; take 85 of them.
        let readings = daily_readings((2023, 6, 1), 85, 200.0);
        let buckets = calculate_seasonal_averages(&readings);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].season, Season::CoolDry);
        assert_eq!(buckets[0].avg_daily_volume, 200.0);
    }

    #[test]
    fn test_one_short_of_threshold_is_dropped() {
        // ---
        let readings = daily_readings((2023, 6, 1), 84, 200.0);
        assert!(calculate_seasonal_averages(&readings).is_empty());
    }

    #[test]
    fn test_multiple_readings_per_day_are_summed_first() {
        // ---
        let mut readings = daily_readings((2023, 3, 1), 90, 100.0);
        readings.extend(daily_readings((2023, 3, 1), 90, 50.0));
        let buckets = calculate_seasonal_averages(&readings);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].season, Season::LongRains);
        assert_eq!(buckets[0].avg_daily_volume, 150.0);
    }

    #[test]
    fn test_seasons_reported_in_calendar_order() {
        // ---
        // Hot Dry spans the year boundary: Dec 2022 through Feb 2023.
        let mut readings = daily_readings((2023, 9, 1), 91, 10.0);
        readings.extend(daily_readings((2022, 12, 1), 90, 30.0));
        readings.extend(daily_readings((2023, 6, 1), 20, 99.0));
        let buckets = calculate_seasonal_averages(&readings);

        let seasons: Vec<Season> = buckets.iter().map(|b| b.season).collect();
        assert_eq!(seasons, vec![Season::HotDry, Season::ShortRains]);
        assert_eq!(buckets[0].season_label, "Hot Dry (Dec-Feb)");
        assert_eq!(buckets[0].avg_daily_volume, 30.0);
    }
}
