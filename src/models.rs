//! Data models for the water-point sensor pipeline.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

// ---

/// One hourly log row as read from a sensor dataset.
///
/// Numeric columns are optional because the exported logs contain blank cells;
/// aggregations skip missing values rather than treating them as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    // ---
    pub timestamp_utc: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub liters: Option<f64>,
    pub temperature: Option<f64>,
    pub red_flag: bool,
    pub qr_code: Option<String>,
    pub community_name: Option<String>,
    pub service_provider: Option<String>,
    pub water_point_name: Option<String>,
    pub installation_date: Option<String>,
    pub model: Option<String>,
}

/// A descriptive metadata value, or the `Unknown` sentinel when the column is
/// absent or has no values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaField {
    Known(String),
    Unknown,
}

impl MetaField {
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn as_str(&self) -> &str {
        match self {
            MetaField::Known(value) => value,
            MetaField::Unknown => Self::UNKNOWN,
        }
    }
}

impl From<Option<String>> for MetaField {
    fn from(value: Option<String>) -> Self {
        value.map_or(MetaField::Unknown, MetaField::Known)
    }
}

impl fmt::Display for MetaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MetaField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Geographic position of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const ORIGIN: Coordinates = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
    };
}

/// Mostly-static description of a sensor, derived once per dataset load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorMetadata {
    // ---
    pub location: Coordinates,

    /// True when no row carried both coordinates and `location` fell back to
    /// (0, 0). Timezone resolution still runs against that point.
    pub coordinates_defaulted: bool,

    pub community_name: MetaField,
    pub service_provider: MetaField,
    pub water_point_name: MetaField,
    pub installation_date: MetaField,
    pub model: MetaField,
    pub qr_code: MetaField,
}

/// Fixed three-month grouping used for seasonal aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Season {
    HotDry,
    LongRains,
    CoolDry,
    ShortRains,
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::HotDry,
        Season::LongRains,
        Season::CoolDry,
        Season::ShortRains,
    ];

    /// Map a calendar month (1-12) to its season. Months outside that range
    /// cannot come out of a calendar date; they fall through to `ShortRains`.
    pub fn from_month(month: u32) -> Season {
        match month {
            12 | 1 | 2 => Season::HotDry,
            3..=5 => Season::LongRains,
            6..=8 => Season::CoolDry,
            _ => Season::ShortRains,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Season::HotDry => "Hot Dry (Dec-Feb)",
            Season::LongRains => "Long Rains (Mar-May)",
            Season::CoolDry => "Cool Dry (Jun-Aug)",
            Season::ShortRains => "Short Rains (Sep-Nov)",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A reading placed on the sensor's local calendar.
#[derive(Debug, Clone)]
pub struct LocalizedReading {
    // ---
    pub reading: Reading,
    pub local_timestamp: DateTime<Tz>,
    pub date: NaiveDate,
    pub month: u32,
    pub hour: u32,
    pub season: Season,
}

/// Average daily volume for a season that met the completeness threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalBucket {
    pub season: Season,
    pub season_label: &'static str,
    pub avg_daily_volume: f64,
}

/// Headline usage numbers. `None` means the underlying window had no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KeyMetrics {
    // ---
    pub avg_liters_hour_recent_day: Option<i64>,
    pub avg_liters_hour_7d: Option<i64>,
    pub avg_liters_day_7d: Option<i64>,
    pub estimated_beneficiaries: Option<i64>,
}

impl KeyMetrics {
    /// Captions shown next to each metric on the dashboard, in display order.
    pub const LABELS: [&'static str; 4] = [
        "Avg Liters/Hour (Recent Day)",
        "Avg Liters/Hour (Last 7 Days)",
        "Avg Liters/Day (Last 7 Days)",
        "Estimated Beneficiaries",
    ];
}
