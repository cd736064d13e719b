//! Configuration loader for the `waterpoint-dashboard` service.
//!
//! Runtime settings come from environment variables (with optional `.env`
//! support provided by the caller). The password allow-list lives in a
//! separate JSON file inside the data directory and is read once at start-up.
//!
use std::{env, fs, net::SocketAddr, path::Path, path::PathBuf, time::Duration};

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::error::DashboardError;

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u64 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

pub const DEFAULT_DATA_DIR: &str = "/var/www/sensor-data";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Directory holding the `sensor-<id>-hourly-logs.csv` files.
    pub data_dir: PathBuf,

    /// JSON file with the accepted dashboard passwords.
    pub passwords_path: PathBuf,

    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,

    /// Rows read from each dataset when building the landing list.
    pub preview_rows: usize,

    /// Idle time after which a browser session is dropped.
    pub session_ttl: Duration,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `SENSOR_DATA_DIR` – dataset directory (default: `/var/www/sensor-data`)
/// - `DASHBOARD_CONFIG` – password file (default: `<data dir>/config/dashboard-config.json`)
/// - `BIND_ADDR` – listen address (default: `0.0.0.0:8080`)
/// - `CATALOG_PREVIEW_ROWS` – landing preview rows per sensor (default: 2000)
/// - `SESSION_TTL_SECS` – session idle timeout (default: 28800)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let data_dir = PathBuf::from(env_or!("SENSOR_DATA_DIR", DEFAULT_DATA_DIR));
    let passwords_path = env::var("DASHBOARD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir.join("config").join("dashboard-config.json"));
    let bind_addr = env_or!("BIND_ADDR", "0.0.0.0:8080")
        .parse::<SocketAddr>()
        .map_err(|e| anyhow!("Invalid BIND_ADDR: {}", e))?;
    let preview_rows = parse_env_u64!("CATALOG_PREVIEW_ROWS", 2000) as usize;
    let session_ttl = Duration::from_secs(parse_env_u64!("SESSION_TTL_SECS", 28800));

    Ok(Config {
        data_dir,
        passwords_path,
        bind_addr,
        preview_rows,
        session_ttl,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  SENSOR_DATA_DIR      : {}", self.data_dir.display());
        tracing::info!("  DASHBOARD_CONFIG     : {}", self.passwords_path.display());
        tracing::info!("  BIND_ADDR            : {}", self.bind_addr);
        tracing::info!("  CATALOG_PREVIEW_ROWS : {}", self.preview_rows);
        tracing::info!("  SESSION_TTL_SECS     : {}", self.session_ttl.as_secs());
    }
}

// ---

#[derive(Debug, Deserialize)]
struct PasswordFile {
    passwords: Vec<String>,
}

/// Process-wide set of accepted dashboard passwords. Read-only once loaded.
///
/// Secrets are compared in plain text, exactly as stored in the file.
#[derive(Clone, Default)]
pub struct PasswordAllowList {
    passwords: Vec<String>,
}

impl std::fmt::Debug for PasswordAllowList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordAllowList")
            .field("len", &self.passwords.len())
            .finish()
    }
}

impl PasswordAllowList {
    // ---
    pub fn new<I, S>(passwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            passwords: passwords.into_iter().map(Into::into).collect(),
        }
    }

    /// Load the allow-list, logging and falling back to an empty list (every
    /// login fails) when the file is missing or malformed.
    pub fn load(path: &Path) -> Self {
        // ---
        match Self::try_load(path) {
            Ok(list) => {
                tracing::info!(
                    "Loaded {} dashboard passwords from {}",
                    list.len(),
                    path.display()
                );
                list
            }
            Err(e) => {
                tracing::error!("{}; all logins will be rejected", e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, DashboardError> {
        // ---
        let raw = fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!(
                "configuration file '{}' not readable: {}",
                path.display(),
                e
            ))
        })?;
        let file: PasswordFile = serde_json::from_str(&raw).map_err(|e| {
            DashboardError::Config(format!("invalid JSON in '{}': {}", path.display(), e))
        })?;
        Ok(Self::new(file.passwords))
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.passwords.iter().any(|p| p == candidate)
    }

    pub fn len(&self) -> usize {
        self.passwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passwords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_load_password_file() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard-config.json");
        fs::write(&path, r#"{"passwords": ["letmein", "hunter2"]}"#).unwrap();

        let list = PasswordAllowList::load(&path);
        assert_eq!(list.len(), 2);
        assert!(list.contains("hunter2"));
        assert!(!list.contains("Hunter2"));
    }

    #[test]
    fn test_missing_file_gives_empty_list() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        assert!(matches!(
            PasswordAllowList::try_load(&path),
            Err(DashboardError::Config(_))
        ));
        assert!(PasswordAllowList::load(&path).is_empty());
    }

    #[test]
    fn test_malformed_structure_gives_empty_list() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard-config.json");

        fs::write(&path, r#"{"passwords": "letmein"}"#).unwrap();
        assert!(PasswordAllowList::load(&path).is_empty());

        fs::write(&path, "not json").unwrap();
        assert!(PasswordAllowList::load(&path).is_empty());
    }

    #[test]
    fn test_debug_does_not_leak_secrets() {
        // ---
        let list = PasswordAllowList::new(["s3cret"]);
        assert!(!format!("{list:?}").contains("s3cret"));
    }
}
