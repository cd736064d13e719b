//! Error taxonomy shared by every dashboard component.
//!
//! Dataset-level failures (`Config`, `DataFormat`, `Resolution`, plus the I/O
//! and CSV wrappers) abort a single dataset load and are turned into a
//! user-visible message for that render only. `NotFound` and `Auth` never
//! escape the session router; they select the page that gets rendered.

use thiserror::Error;

// ---

#[derive(Debug, Error)]
pub enum DashboardError {
    // ---
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("Could not determine the timezone for the location ({latitude}, {longitude})")]
    Resolution { latitude: f64, longitude: f64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Incorrect password. Please try again.")]
    Auth,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
