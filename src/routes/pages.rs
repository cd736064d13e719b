//! Navigation routes: `/`, `/sensor/{sensor_id}`, and the fallback for every
//! other path. All of them feed the request path to the session router.

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::Response,
    routing::get,
    Router,
};
use tracing::info;

use super::handle_event;
use crate::{Event, SharedContext};

// ---

pub fn router() -> Router<SharedContext> {
    // ---
    Router::new()
        .route("/", get(navigate))
        .route("/sensor/{sensor_id}", get(navigate))
}

pub(super) async fn navigate(
    State(context): State<SharedContext>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    // ---
    info!("GET {}", uri.path());
    let event = Event::Navigate {
        path: uri.path().to_string(),
    };
    handle_event(context, &headers, event).await
}
