//! Computed sensor dashboard.
//!
//! Loads one sensor's history, localizes it and assembles everything the
//! detail page shows: metadata, headline metrics, seasonal averages and the
//! data series behind each chart. Nothing here is cached; every call re-reads
//! the dataset.

use chrono::{NaiveDate, SecondsFormat};
use serde::Serialize;
use tracing::{debug, info};

use crate::bucketing::localize_all;
use crate::catalog::SensorCatalog;
use crate::error::Result;
use crate::metadata::extract_metadata;
use crate::metrics::{calculate_key_metrics, daily_totals, hourly_means};
use crate::models::{KeyMetrics, LocalizedReading, Reading, SeasonalBucket, SensorMetadata};
use crate::seasonal::calculate_seasonal_averages;
use crate::timezone::{TimeZoneResolver, ZoneLookup};

// ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyFlowPoint {
    pub date: NaiveDate,
    pub liters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyUsagePoint {
    pub hour: u32,
    pub liters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperaturePoint {
    pub temperature: f64,
    pub liters: f64,
}

/// Everything the sensor detail page renders.
#[derive(Debug, Clone, Serialize)]
pub struct SensorDashboard {
    // ---
    pub sensor_id: String,
    pub metadata: SensorMetadata,

    /// IANA zone used for every local date and hour below.
    pub timezone: String,

    pub last_reading_local: Option<String>,

    /// Count of readings flagged as anomalous over the loaded history.
    pub red_flag_events: usize,

    pub key_metrics: KeyMetrics,
    pub key_metric_labels: [&'static str; 4],
    pub seasonal_averages: Vec<SeasonalBucket>,
    pub daily_flow: Vec<DailyFlowPoint>,
    pub hourly_usage: Vec<HourlyUsagePoint>,
    pub usage_vs_temperature: Vec<TemperaturePoint>,
}

/// Load and compute the dashboard for `sensor_id`.
pub fn build_dashboard(
    catalog: &SensorCatalog,
    lookup: &dyn ZoneLookup,
    sensor_id: &str,
) -> Result<SensorDashboard> {
    // ---
    info!("Building dashboard for sensor {}", sensor_id);
    let readings = catalog.load(sensor_id)?;
    compute_dashboard(sensor_id, &readings, lookup)
}

/// Compute the dashboard from readings already in memory.
pub fn compute_dashboard(
    sensor_id: &str,
    readings: &[Reading],
    lookup: &dyn ZoneLookup,
) -> Result<SensorDashboard> {
    // ---
    let metadata = extract_metadata(readings);
    let tz = TimeZoneResolver::new(lookup).resolve(metadata.location)?;
    let localized = localize_all(readings, tz);

    debug!(
        "Sensor {}: {} readings localized to {}",
        sensor_id,
        localized.len(),
        tz.name()
    );

    Ok(SensorDashboard {
        sensor_id: sensor_id.to_string(),
        timezone: tz.name().to_string(),
        last_reading_local: localized
            .iter()
            .map(|r| r.local_timestamp)
            .max()
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
        red_flag_events: readings.iter().filter(|r| r.red_flag).count(),
        key_metrics: calculate_key_metrics(&localized),
        key_metric_labels: KeyMetrics::LABELS,
        seasonal_averages: calculate_seasonal_averages(&localized),
        daily_flow: daily_flow(&localized),
        hourly_usage: hourly_usage(&localized),
        usage_vs_temperature: usage_vs_temperature(readings),
        metadata,
    })
}

/// Total liters per local date, ascending.
pub fn daily_flow(readings: &[LocalizedReading]) -> Vec<DailyFlowPoint> {
    daily_totals(readings)
        .into_iter()
        .map(|(date, liters)| DailyFlowPoint { date, liters })
        .collect()
}

/// Mean liters per local hour across the whole history.
pub fn hourly_usage(readings: &[LocalizedReading]) -> Vec<HourlyUsagePoint> {
    hourly_means(readings)
        .into_iter()
        .map(|(hour, liters)| HourlyUsagePoint { hour, liters })
        .collect()
}

fn usage_vs_temperature(readings: &[Reading]) -> Vec<TemperaturePoint> {
    readings
        .iter()
        .filter_map(|r| {
            Some(TemperaturePoint {
                temperature: r.temperature?,
                liters: r.liters?,
            })
        })
        .collect()
}
