//! Application entry point for the `waterpoint-dashboard` service.
//!
//! This binary orchestrates the startup sequence for the dashboard backend:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Reading the password allow-list once for the process lifetime
//! - Building the timezone boundary index shared by all sessions
//! - Mounting all routes via the `routes` gateway
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `SENSOR_DATA_DIR` (optional) – dataset directory (default: `/var/www/sensor-data`)
//! - `DASHBOARD_CONFIG` (optional) – password file path
//! - `BIND_ADDR` (optional) – listen address (default: `0.0.0.0:8080`)
//! - `DASHBOARD_LOG_LEVEL` (optional) – log verbosity (default: `info`)
//! - `DASHBOARD_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, sync::Arc};

use anyhow::Result;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use waterpoint_dashboard::{
    build_app, config, timezone::BoundaryLookup, AppContext, PasswordAllowList,
};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let allow_list = PasswordAllowList::load(&cfg.passwords_path);

    tracing::info!("Loading timezone boundary index");
    let lookup = tokio::task::spawn_blocking(BoundaryLookup::new).await?;

    let context = Arc::new(AppContext::new(&cfg, allow_list, Arc::new(lookup)));
    let app = build_app(context);

    tracing::info!("Listening on {}", cfg.bind_addr);

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// - Color output controlled by TTY detection and `FORCE_COLOR`:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by `DASHBOARD_SPAN_EVENTS`:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level from `RUST_LOG`, else `DASHBOARD_LOG_LEVEL`
///
/// Call once at startup before any logging macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("DASHBOARD_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to DASHBOARD_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("DASHBOARD_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("{level},hyper=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
