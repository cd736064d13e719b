//! Discovery of per-sensor datasets in the data directory.
//!
//! Sensor logs follow the `sensor-<id>-hourly-logs.csv` naming convention. The
//! landing page only needs a short description of each sensor, so the catalog
//! reads a bounded prefix of every file and runs metadata extraction on that.
//! For a sensor whose descriptive columns change beyond the prefix, the landing
//! label can differ from the full dashboard.

use std::{fs, path::PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::dataset;
use crate::error::{DashboardError, Result};
use crate::metadata::extract_metadata;
use crate::models::{MetaField, Reading};

// ---

const FILE_PREFIX: &str = "sensor-";
const FILE_SUFFIX: &str = "-hourly-logs.csv";

/// Brief description of a sensor for the landing list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorDescriptor {
    // ---
    pub sensor_id: String,
    pub label: String,
    pub water_point_name: MetaField,
    pub community_name: MetaField,
    pub service_provider: MetaField,
    pub qr_code: MetaField,
}

/// Read-only view over the sensor data directory.
#[derive(Debug, Clone)]
pub struct SensorCatalog {
    data_dir: PathBuf,
    preview_rows: usize,
}

/// Sensor ids are embedded in file names, so only plain identifiers are
/// accepted: ASCII letters, digits and `_`.
pub fn is_valid_sensor_id(sensor_id: &str) -> bool {
    !sensor_id.is_empty()
        && sensor_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl SensorCatalog {
    // ---
    pub fn new(data_dir: impl Into<PathBuf>, preview_rows: usize) -> Self {
        Self {
            data_dir: data_dir.into(),
            preview_rows,
        }
    }

    /// Path of the dataset for `sensor_id`, if the id is well formed.
    pub fn dataset_path(&self, sensor_id: &str) -> Option<PathBuf> {
        is_valid_sensor_id(sensor_id)
            .then(|| self.data_dir.join(format!("{FILE_PREFIX}{sensor_id}{FILE_SUFFIX}")))
    }

    /// True when a dataset file exists for `sensor_id`.
    pub fn contains(&self, sensor_id: &str) -> bool {
        self.dataset_path(sensor_id)
            .is_some_and(|path| path.is_file())
    }

    /// Ids of all datasets in the data directory, sorted.
    pub fn sensor_ids(&self) -> Result<Vec<String>> {
        // ---
        let mut ids: Vec<String> = fs::read_dir(&self.data_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let id = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
                is_valid_sensor_id(id).then(|| id.to_string())
            })
            .collect();
        ids.sort();
        debug!("Found {} sensor datasets in {}", ids.len(), self.data_dir.display());
        Ok(ids)
    }

    /// Load the full history for `sensor_id`.
    pub fn load(&self, sensor_id: &str) -> Result<Vec<Reading>> {
        // ---
        let path = self
            .dataset_path(sensor_id)
            .filter(|path| path.is_file())
            .ok_or_else(|| DashboardError::NotFound(format!("sensor {sensor_id}")))?;
        dataset::load_readings(&path)
    }

    /// Describe one sensor from the bounded prefix of its dataset.
    pub fn describe(&self, sensor_id: &str) -> Result<SensorDescriptor> {
        // ---
        let path = self
            .dataset_path(sensor_id)
            .ok_or_else(|| DashboardError::NotFound(format!("sensor {sensor_id}")))?;
        let preview = dataset::load_prefix(&path, self.preview_rows)?;
        let meta = extract_metadata(&preview);

        Ok(SensorDescriptor {
            sensor_id: sensor_id.to_string(),
            label: format!("{} (Sensor {})", meta.water_point_name, sensor_id),
            water_point_name: meta.water_point_name,
            community_name: meta.community_name,
            service_provider: meta.service_provider,
            qr_code: meta.qr_code,
        })
    }

    /// Describe every sensor. Datasets that fail to load are skipped.
    pub fn describe_all(&self) -> Result<Vec<SensorDescriptor>> {
        // ---
        let descriptors = self
            .sensor_ids()?
            .into_iter()
            .filter_map(|id| match self.describe(&id) {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    warn!("Skipping sensor {} on landing page: {}", id, e);
                    None
                }
            })
            .collect();
        Ok(descriptors)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use std::path::Path;

    const HEADER: &str = "gmt_datetime,latitude,longitude,community_name,service_provider,\
water_point_name,installation_date,model,qr_code,liters,temperature,red_flag\n";

    fn write_dataset(dir: &Path, id: &str, rows: &[(&str, &str)]) {
        // ---
        let mut body = HEADER.to_string();
        for (i, (water_point, community)) in rows.iter().enumerate() {
            body.push_str(&format!(
                "2024-03-01 {:02}:00:00,-1.3,36.8,{community},Aquaya,{water_point},,CW-2,{id},5,25,0\n",
                i % 24
            ));
        }
        fs::write(dir.join(format!("sensor-{id}-hourly-logs.csv")), body).unwrap();
    }

    #[test]
    fn test_discovers_by_naming_convention() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "B22", &[("South", "Kibera")]);
        write_dataset(dir.path(), "A11", &[("North", "Kibera")]);
        fs::write(dir.path().join("sensor-A11-daily-logs.csv"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();

        let catalog = SensorCatalog::new(dir.path(), 100);
        assert_eq!(catalog.sensor_ids().unwrap(), vec!["A11", "B22"]);
        assert!(catalog.contains("A11"));
        assert!(!catalog.contains("999"));
    }

    #[test]
    fn test_rejects_ids_that_leave_data_dir() {
        // ---
        let catalog = SensorCatalog::new("/tmp", 10);
        assert!(catalog.dataset_path("../etc/passwd").is_none());
        assert!(catalog.dataset_path("a-b").is_none());
        assert!(catalog.dataset_path("").is_none());
        assert!(catalog.dataset_path("ABC_123").is_some());
    }

    #[test]
    fn test_descriptor_uses_bounded_prefix() {
        // ---
        // Two "Old Name" rows up front, then three "New Name" rows. A two-row preview
        // only sees the old name even though the full-data mode is the new one.
        let dir = tempfile::tempdir().unwrap();
        write_dataset(
            dir.path(),
            "C33",
            &[
                ("Old Name", "Kibera"),
                ("Old Name", "Kibera"),
                ("New Name", "Kibera"),
                ("New Name", "Kibera"),
                ("New Name", "Kibera"),
            ],
        );

        let preview = SensorCatalog::new(dir.path(), 2).describe("C33").unwrap();
        assert_eq!(preview.water_point_name.as_str(), "Old Name");
        assert_eq!(preview.label, "Old Name (Sensor C33)");

        let full = SensorCatalog::new(dir.path(), 100).describe("C33").unwrap();
        assert_eq!(full.water_point_name.as_str(), "New Name");
    }

    #[test]
    fn test_describe_all_skips_broken_files() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "A11", &[("North", "Kibera")]);
        fs::write(dir.path().join("sensor-BAD-hourly-logs.csv"), "just,one,column\n").unwrap();

        let descriptors = SensorCatalog::new(dir.path(), 10).describe_all().unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].sensor_id, "A11");
        assert_eq!(descriptors[0].community_name.as_str(), "Kibera");
    }

    #[test]
    fn test_load_unknown_sensor_is_not_found() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let err = SensorCatalog::new(dir.path(), 10).load("999").unwrap_err();
        assert!(matches!(err, DashboardError::NotFound(_)));
    }
}
