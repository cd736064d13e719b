//! Per-session authentication and navigation state machine.
//!
//! Every browser session owns a [`SessionState`]. Events (login attempts,
//! sensor selection, navigation, logout) are applied by [`SessionRouter`],
//! which only reads shared, immutable resources: the password allow-list and
//! the sensor catalog. Rendering is a separate pure step from state to
//! [`View`], recomputing sensor dashboards from source data on every call.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{SensorCatalog, SensorDescriptor};
use crate::config::PasswordAllowList;
use crate::dashboard::{build_dashboard, SensorDashboard};
use crate::error::DashboardError;
use crate::timezone::ZoneLookup;

// ---

/// The page a session is currently on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    Unauthenticated { message: Option<String> },
    Landing,
    SensorView { sensor_id: String },
    NotFound,
}

/// State owned by exactly one browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
    pub selected_sensor_id: Option<String>,
    pub page: Page,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            authenticated: false,
            selected_sensor_id: None,
            page: Page::Unauthenticated { message: None },
        }
    }
}

/// Inputs a session can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Password submitted from the login form.
    Submit { password: String },
    /// Sensor picked (or cleared) in the landing selector.
    Select { sensor_id: Option<String> },
    /// "Go" pressed for the current selection.
    Confirm,
    /// Direct navigation to a path.
    Navigate { path: String },
    /// Logout or session expiry.
    Logout,
}

/// Where a path points, before checking the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Sensor(String),
    Unknown,
}

/// Parse a navigation path: `/` or `/sensor/<id>`.
pub fn parse_path(path: &str) -> Route {
    // ---
    match path {
        "/" | "" => Route::Landing,
        _ => match path.strip_prefix("/sensor/") {
            Some(id) if !id.is_empty() && !id.contains('/') => Route::Sensor(id.to_string()),
            _ => Route::Unknown,
        },
    }
}

/// Applies events to session state against shared read-only resources.
pub struct SessionRouter<'a> {
    allow_list: &'a PasswordAllowList,
    catalog: &'a SensorCatalog,
}

impl<'a> SessionRouter<'a> {
    // ---
    pub fn new(allow_list: &'a PasswordAllowList, catalog: &'a SensorCatalog) -> Self {
        Self {
            allow_list,
            catalog,
        }
    }

    /// Apply `event` to `state`.
    pub fn dispatch(&self, state: &mut SessionState, event: Event) {
        // ---
        match event {
            Event::Submit { password } => self.submit(state, &password),
            Event::Select { sensor_id } => select(state, sensor_id),
            Event::Confirm => self.confirm(state),
            Event::Navigate { path } => self.navigate(state, &path),
            Event::Logout => {
                info!("Session logged out");
                *state = SessionState::default();
            }
        }
    }

    /// Check a password. A miss leaves the session unauthenticated with the
    /// failure message attached.
    pub fn authenticate(&self, password: &str) -> Result<(), DashboardError> {
        if self.allow_list.contains(password) {
            Ok(())
        } else {
            Err(DashboardError::Auth)
        }
    }

    fn submit(&self, state: &mut SessionState, password: &str) {
        // ---
        match self.authenticate(password) {
            Ok(()) => {
                info!("Session authenticated");
                state.authenticated = true;
                state.page = Page::Landing;
            }
            Err(e) => {
                warn!("Rejected login attempt");
                if !state.authenticated {
                    state.page = Page::Unauthenticated {
                        message: Some(e.to_string()),
                    };
                }
            }
        }
    }

    fn confirm(&self, state: &mut SessionState) {
        // ---
        if !state.authenticated {
            return;
        }
        state.page = match state.selected_sensor_id.clone() {
            Some(sensor_id) => self.sensor_page(sensor_id),
            None => Page::Landing,
        };
    }

    fn navigate(&self, state: &mut SessionState, path: &str) {
        // ---
        if !state.authenticated {
            state.page = Page::Unauthenticated { message: None };
            return;
        }
        state.page = match parse_path(path) {
            Route::Landing => Page::Landing,
            Route::Sensor(sensor_id) => self.sensor_page(sensor_id),
            Route::Unknown => {
                debug!("No route for {}", path);
                Page::NotFound
            }
        };
    }

    fn sensor_page(&self, sensor_id: String) -> Page {
        if self.catalog.contains(&sensor_id) {
            Page::SensorView { sensor_id }
        } else {
            debug!("No dataset for sensor {}", sensor_id);
            Page::NotFound
        }
    }
}

/// A selection is only taken from the landing page's sensor list.
fn select(state: &mut SessionState, sensor_id: Option<String>) {
    if state.authenticated && state.page == Page::Landing {
        state.selected_sensor_id = sensor_id.filter(|id| !id.is_empty());
    }
}

// ---

/// Rendered output for the current page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum View {
    Login {
        message: Option<String>,
    },
    Landing {
        sensors: Vec<SensorDescriptor>,
        selected_sensor_id: Option<String>,
        go_enabled: bool,
    },
    Sensor(Box<SensorDashboard>),
    NotFound {
        message: String,
    },
    LoadFailed {
        sensor_id: Option<String>,
        message: String,
    },
}

/// Render the view for `state`.
///
/// Load failures become [`View::LoadFailed`] for this render only; the session
/// state itself is untouched.
pub fn render(state: &SessionState, catalog: &SensorCatalog, lookup: &dyn ZoneLookup) -> View {
    // ---
    match &state.page {
        Page::Unauthenticated { message } => View::Login {
            message: message.clone(),
        },
        Page::Landing => match catalog.describe_all() {
            Ok(sensors) => View::Landing {
                sensors,
                selected_sensor_id: state.selected_sensor_id.clone(),
                go_enabled: state.selected_sensor_id.is_some(),
            },
            Err(e) => {
                tracing::error!("Failed to list sensors: {}", e);
                View::LoadFailed {
                    sensor_id: None,
                    message: e.to_string(),
                }
            }
        },
        Page::SensorView { sensor_id } => match build_dashboard(catalog, lookup, sensor_id) {
            Ok(dashboard) => View::Sensor(Box::new(dashboard)),
            Err(DashboardError::NotFound(_)) => not_found(),
            Err(e) => {
                tracing::error!("Failed to load sensor {}: {}", sensor_id, e);
                View::LoadFailed {
                    sensor_id: Some(sensor_id.clone()),
                    message: e.to_string(),
                }
            }
        },
        Page::NotFound => not_found(),
    }
}

fn not_found() -> View {
    View::NotFound {
        message: "404: Page not found".to_string(),
    }
}
