//! Coordinate to timezone resolution.
//!
//! The boundary lookup sits behind the [`ZoneLookup`] trait so the service can
//! share one expensive polygon index across sessions while tests plug in a
//! fixed answer.

use std::fmt;

use chrono_tz::Tz;
use tracing::debug;
use tzf_rs::DefaultFinder;

use crate::error::{DashboardError, Result};
use crate::models::Coordinates;

// ---

/// Maps a point to an IANA zone name, or `None` when no zone covers it.
pub trait ZoneLookup: Send + Sync {
    fn zone_name(&self, coords: Coordinates) -> Option<String>;
}

/// Polygon-backed lookup over the bundled timezone boundary data.
pub struct BoundaryLookup {
    finder: DefaultFinder,
}

impl BoundaryLookup {
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }
}

impl Default for BoundaryLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BoundaryLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryLookup").finish_non_exhaustive()
    }
}

impl ZoneLookup for BoundaryLookup {
    fn zone_name(&self, coords: Coordinates) -> Option<String> {
        // The finder takes (lng, lat) and answers "" for uncovered points.
        let name = self.finder.get_tz_name(coords.longitude, coords.latitude);
        (!name.is_empty()).then(|| name.to_string())
    }
}

/// Lookup that always answers with the same zone (or none).
#[derive(Debug, Clone)]
pub struct FixedZoneLookup(pub Option<String>);

impl ZoneLookup for FixedZoneLookup {
    fn zone_name(&self, _coords: Coordinates) -> Option<String> {
        self.0.clone()
    }
}

/// Resolves sensor coordinates to a zone in the IANA database.
pub struct TimeZoneResolver<'a> {
    lookup: &'a dyn ZoneLookup,
}

impl<'a> TimeZoneResolver<'a> {
    pub fn new(lookup: &'a dyn ZoneLookup) -> Self {
        Self { lookup }
    }

    /// Resolve `coords` to a zone.
    ///
    /// Fails with [`DashboardError::Resolution`] when the lookup has no answer
    /// or answers with a name the zone database does not know. Callers abort
    /// the dataset load instead of assuming UTC.
    pub fn resolve(&self, coords: Coordinates) -> Result<Tz> {
        // ---
        let unresolved = || DashboardError::Resolution {
            latitude: coords.latitude,
            longitude: coords.longitude,
        };

        let name = self.lookup.zone_name(coords).ok_or_else(unresolved)?;
        let tz = name.parse::<Tz>().map_err(|_| unresolved())?;
        debug!(
            "Resolved ({}, {}) to {}",
            coords.latitude, coords.longitude, name
        );
        Ok(tz)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeZone, Utc};

    const NAIROBI: Coordinates = Coordinates {
        latitude: -1.2864,
        longitude: 36.8172,
    };

    #[test]
    fn test_boundary_lookup_nairobi() {
        // ---
        let lookup = BoundaryLookup::new();
        let tz = TimeZoneResolver::new(&lookup).resolve(NAIROBI).unwrap();
        assert_eq!(tz, chrono_tz::Africa::Nairobi);
    }

    #[test]
    fn test_origin_coordinates_resolve_to_etc_gmt() {
        // ---
        // (0, 0) is open ocean in the Gulf of Guinea. The boundary data covers it
        // with a nautical zone, so a sensor with no coordinates still resolves.
        let lookup = BoundaryLookup::new();
        let tz = TimeZoneResolver::new(&lookup)
            .resolve(Coordinates::ORIGIN)
            .unwrap();
        assert_eq!(tz.name(), "Etc/GMT");
    }

    #[test]
    fn test_no_zone_is_resolution_error() {
        // ---
        let lookup = FixedZoneLookup(None);
        let err = TimeZoneResolver::new(&lookup).resolve(NAIROBI).unwrap_err();
        assert!(matches!(err, DashboardError::Resolution { .. }));
    }

    #[test]
    fn test_unknown_zone_name_is_resolution_error() {
        // ---
        let lookup = FixedZoneLookup(Some("Atlantis/Lost_City".into()));
        let err = TimeZoneResolver::new(&lookup).resolve(NAIROBI).unwrap_err();
        assert!(matches!(err, DashboardError::Resolution { .. }));
    }

    #[test]
    fn test_local_round_trip_recovers_instant() {
        // ---
        let lookup = FixedZoneLookup(Some("Africa/Nairobi".into()));
        let tz = TimeZoneResolver::new(&lookup).resolve(NAIROBI).unwrap();

        let instant = Utc.with_ymd_and_hms(2024, 7, 14, 22, 30, 0).unwrap();
        let local = instant.with_timezone(&tz);
        let naive_local = local.naive_local();
        let back = tz
            .from_local_datetime(&naive_local)
            .single()
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(back, instant);
        assert_eq!(naive_local.to_string(), "2024-07-15 01:30:00");
    }
}
