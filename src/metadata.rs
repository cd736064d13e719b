//! Sensor metadata extraction.
//!
//! Descriptive columns are near-constant per sensor but occasionally carry
//! typos or blanks, so each field is taken as the statistical mode of its
//! column rather than from any single row.

use std::collections::HashMap;

use crate::models::{Coordinates, MetaField, Reading, SensorMetadata};

// ---

/// Derive [`SensorMetadata`] from a set of readings.
///
/// Coordinates come from the first row carrying both latitude and longitude;
/// with none present they default to (0, 0) and `coordinates_defaulted` is
/// set. The default is still passed on to timezone resolution.
pub fn extract_metadata(readings: &[Reading]) -> SensorMetadata {
    // ---
    let located = readings
        .iter()
        .find_map(|r| Some((r.latitude?, r.longitude?)));

    let (location, coordinates_defaulted) = match located {
        Some((latitude, longitude)) => (
            Coordinates {
                latitude,
                longitude,
            },
            false,
        ),
        None => (Coordinates::ORIGIN, true),
    };

    SensorMetadata {
        location,
        coordinates_defaulted,
        community_name: column_mode(readings, |r| r.community_name.as_deref()),
        service_provider: column_mode(readings, |r| r.service_provider.as_deref()),
        water_point_name: column_mode(readings, |r| r.water_point_name.as_deref()),
        installation_date: column_mode(readings, |r| r.installation_date.as_deref()),
        model: column_mode(readings, |r| r.model.as_deref()),
        qr_code: column_mode(readings, |r| r.qr_code.as_deref()),
    }
}

fn column_mode<F>(readings: &[Reading], field: F) -> MetaField
where
    F: Fn(&Reading) -> Option<&str>,
{
    MetaField::from(mode(readings.iter().filter_map(field)).map(str::to_string))
}

/// Most frequent value; ties go to the value that appeared first.
pub fn mode<'a, I>(values: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    // ---
    // value -> (count, first position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(community: Option<&str>, lat: Option<f64>, lon: Option<f64>) -> Reading {
        // ---
        Reading {
            timestamp_utc: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            latitude: lat,
            longitude: lon,
            liters: Some(1.0),
            temperature: None,
            red_flag: false,
            qr_code: Some("ABC123".into()),
            community_name: community.map(str::to_string),
            service_provider: None,
            water_point_name: Some("North Well".into()),
            installation_date: None,
            model: Some("CW-2".into()),
        }
    }

    #[test]
    fn test_mode_majority() {
        assert_eq!(mode(["A", "A", "B"]), Some("A"));
    }

    #[test]
    fn test_mode_tie_prefers_first_seen() {
        assert_eq!(mode(["B", "A", "A", "B"]), Some("B"));
        assert_eq!(mode(["C", "A", "B"]), Some("C"));
    }

    #[test]
    fn test_mode_empty() {
        assert_eq!(mode(std::iter::empty()), None);
    }

    #[test]
    fn test_extract_uses_mode_and_unknown() {
        // ---
        let readings = vec![
            reading(Some("Kibera"), Some(-1.3), Some(36.8)),
            reading(Some("Kibera"), None, None),
            reading(Some("Kiberra"), None, None),
            reading(None, None, None),
        ];
        let meta = extract_metadata(&readings);

        assert_eq!(meta.community_name, MetaField::Known("Kibera".into()));
        assert_eq!(meta.service_provider, MetaField::Unknown);
        assert_eq!(meta.installation_date, MetaField::Unknown);
        assert_eq!(meta.qr_code.as_str(), "ABC123");
        assert_eq!(meta.location.latitude, -1.3);
        assert!(!meta.coordinates_defaulted);
    }

    #[test]
    fn test_coordinates_need_both_values() {
        // ---
        let readings = vec![
            reading(None, Some(5.0), None),
            reading(None, None, Some(7.0)),
            reading(None, Some(-0.5), Some(34.7)),
        ];
        let meta = extract_metadata(&readings);
        assert_eq!(meta.location.latitude, -0.5);
        assert_eq!(meta.location.longitude, 34.7);
    }

    #[test]
    fn test_missing_coordinates_default_to_origin() {
        // ---
        // No row carries a full position: the (0, 0) fallback is kept and flagged.
        let readings = vec![reading(None, Some(5.0), None), reading(None, None, None)];
        let meta = extract_metadata(&readings);
        assert_eq!(meta.location, Coordinates::ORIGIN);
        assert!(meta.coordinates_defaulted);

        let empty = extract_metadata(&[]);
        assert_eq!(empty.location, Coordinates::ORIGIN);
        assert_eq!(empty.water_point_name, MetaField::Unknown);
    }
}
