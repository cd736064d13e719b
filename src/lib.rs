//! Water-point sensor dashboard backend.
//!
//! Turns per-sensor hourly flow logs into localized usage metrics and serves
//! them behind a small password-gated, per-session navigation flow.
//!
//! Module layout (leaf first):
//! - `dataset` – CSV log reader
//! - `timezone` – coordinate to IANA zone resolution
//! - `metadata` – mode-based sensor metadata
//! - `bucketing` – UTC to local date/hour/season
//! - `metrics`, `seasonal` – usage aggregates
//! - `catalog` – dataset discovery and landing previews
//! - `dashboard` – the computed sensor view
//! - `session`, `session_store` – per-session state machine and storage
//! - `routes` – HTTP gateway
use std::sync::Arc;

pub mod bucketing;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod metadata;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod seasonal;
pub mod session;
pub mod session_store;
pub mod timezone;

pub use catalog::SensorCatalog;
pub use config::{Config, PasswordAllowList};
pub use error::DashboardError;
pub use session::{Event, Page, SessionRouter, SessionState, View};
pub use session_store::SessionStore;
pub use timezone::ZoneLookup;

// ---

/// Shared, read-only resources plus the session store, one per process.
pub struct AppContext {
    pub allow_list: PasswordAllowList,
    pub catalog: SensorCatalog,
    pub lookup: Arc<dyn ZoneLookup>,
    pub sessions: SessionStore,
}

pub type SharedContext = Arc<AppContext>;

impl AppContext {
    // ---
    pub fn new(config: &Config, allow_list: PasswordAllowList, lookup: Arc<dyn ZoneLookup>) -> Self {
        Self {
            allow_list,
            catalog: SensorCatalog::new(config.data_dir.clone(), config.preview_rows),
            lookup,
            sessions: SessionStore::new(config.session_ttl),
        }
    }

    pub fn router(&self) -> SessionRouter<'_> {
        SessionRouter::new(&self.allow_list, &self.catalog)
    }
}

/// Build the HTTP application for `context`.
pub fn build_app(context: SharedContext) -> axum::Router {
    routes::router(context)
}
