use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{session, Event, SessionState, SharedContext, View};

mod actions;
mod health;
mod pages;

// ---

pub const SESSION_COOKIE: &str = "dashboard_session";

pub fn router(context: SharedContext) -> Router {
    // ---
    Router::new()
        .merge(pages::router())
        .merge(actions::router())
        .merge(health::router())
        .fallback(pages::navigate)
        .with_state(context)
}

// ---

/// Session id from the request's cookie header, if present and well formed.
fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    // ---
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

/// Run one event through the caller's session, then render the resulting page.
///
/// The session is checked out, updated and saved before rendering so a slow
/// dataset load never holds the store lock.
async fn handle_event(context: SharedContext, headers: &HeaderMap, event: Event) -> Response {
    // ---
    let (id, mut state) = context.sessions.checkout(session_id(headers)).await;
    debug!("Session {} <- {:?}", id, redacted(&event));

    let logout = matches!(event, Event::Logout);
    context.router().dispatch(&mut state, event);

    let keep_session = if logout {
        context.sessions.remove(id).await;
        false
    } else {
        context.sessions.save(id, state.clone()).await
    };
    if !keep_session {
        // Logged out here or by a concurrent request: render as a lost session.
        state = SessionState::default();
    }

    let purged = context.sessions.purge_expired().await;
    if purged > 0 {
        debug!("Purged {} expired sessions", purged);
    }

    render_response(context, id, state, keep_session).await
}

async fn render_response(
    context: SharedContext,
    id: Uuid,
    state: SessionState,
    keep_session: bool,
) -> Response {
    // ---
    let view = tokio::task::spawn_blocking(move || {
        session::render(&state, &context.catalog, context.lookup.as_ref())
    })
    .await;

    let view = match view {
        Ok(view) => view,
        Err(e) => {
            error!("Render task failed: {}", e);
            View::LoadFailed {
                sensor_id: None,
                message: "Failed to render page".to_string(),
            }
        }
    };

    let status = match &view {
        View::Login { .. } => StatusCode::UNAUTHORIZED,
        View::Landing { .. } | View::Sensor(_) => StatusCode::OK,
        View::NotFound { .. } => StatusCode::NOT_FOUND,
        View::LoadFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut response = (status, Json(view)).into_response();
    let cookie = if keep_session {
        format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
    } else {
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    };
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// Event for logging, with any submitted password masked.
fn redacted(event: &Event) -> Event {
    match event {
        Event::Submit { .. } => Event::Submit {
            password: "****".to_string(),
        },
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_session_id_from_cookie_header() {
        // ---
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}")).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn test_bad_cookie_is_ignored() {
        // ---
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("dashboard_session=not-a-uuid"),
        );
        assert_eq!(session_id(&headers), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }

    #[test]
    fn test_redacted_masks_password() {
        // ---
        let event = Event::Submit {
            password: "hunter2".into(),
        };
        assert!(!format!("{:?}", redacted(&event)).contains("hunter2"));
    }
}
