//! Sensor dataset reader.
//!
//! Each sensor has one CSV file of hourly logs with a header row. The header is
//! checked for the required columns before any row is parsed, so a malformed
//! export fails fast with a `DataFormat` error naming what is missing.

use std::{fs::File, io::Read, path::Path};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::models::Reading;

// ---

/// Columns every sensor log must carry. `installation_date` is optional.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "gmt_datetime",
    "latitude",
    "longitude",
    "community_name",
    "service_provider",
    "water_point_name",
    "model",
    "qr_code",
    "liters",
    "temperature",
    "red_flag",
];

/// Row shape as exported by the fetch scripts; blank cells become `None`.
#[derive(Debug, Deserialize)]
struct RawRow {
    // ---
    gmt_datetime: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    community_name: Option<String>,
    service_provider: Option<String>,
    water_point_name: Option<String>,
    #[serde(default)]
    installation_date: Option<String>,
    model: Option<String>,
    qr_code: Option<String>,
    liters: Option<f64>,
    temperature: Option<f64>,
    red_flag: Option<f64>,
}

impl RawRow {
    // ---
    fn into_reading(self, row: usize) -> Result<Reading> {
        // ---
        let timestamp_utc = parse_utc_timestamp(&self.gmt_datetime).ok_or_else(|| {
            DashboardError::DataFormat(format!(
                "row {row}: unparseable gmt_datetime '{}'",
                self.gmt_datetime
            ))
        })?;

        Ok(Reading {
            timestamp_utc,
            latitude: self.latitude,
            longitude: self.longitude,
            liters: self.liters,
            temperature: self.temperature,
            red_flag: self.red_flag == Some(1.0),
            qr_code: non_blank(self.qr_code),
            community_name: non_blank(self.community_name),
            service_provider: non_blank(self.service_provider),
            water_point_name: non_blank(self.water_point_name),
            installation_date: non_blank(self.installation_date),
            model: non_blank(self.model),
        })
    }
}

/// Load every reading from a sensor log file.
pub fn load_readings(path: &Path) -> Result<Vec<Reading>> {
    // ---
    let file = File::open(path)?;
    let readings = read_readings(file, None)?;
    debug!("Loaded {} readings from {}", readings.len(), path.display());
    Ok(readings)
}

/// Load at most `max_rows` readings from the start of a sensor log file.
pub fn load_prefix(path: &Path, max_rows: usize) -> Result<Vec<Reading>> {
    // ---
    let file = File::open(path)?;
    read_readings(file, Some(max_rows))
}

/// Parse readings from any CSV source, stopping after `limit` rows if given.
pub fn read_readings<R: Read>(source: R, limit: Option<usize>) -> Result<Vec<Reading>> {
    // ---
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::DataFormat(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut readings = Vec::new();
    for (i, record) in reader.deserialize::<RawRow>().enumerate() {
        if limit.is_some_and(|max| readings.len() >= max) {
            break;
        }
        // Row numbers are 1-based and count the header line.
        let row = i + 2;
        let raw = record.map_err(|e| DashboardError::DataFormat(format!("row {row}: {e}")))?;
        readings.push(raw.into_reading(row)?);
    }

    Ok(readings)
}

/// Parse a timestamp column value as a UTC instant.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f][+HH:MM]` and the `T`-separated
/// naive form. Values without an offset are taken to be UTC.
pub fn parse_utc_timestamp(value: &str) -> Option<DateTime<Utc>> {
    // ---
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(ts) = DateTime::parse_from_str(value, fmt) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
