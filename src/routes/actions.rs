//! Form actions: login, sensor selection, confirm ("Go") and logout.

use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::handle_event;
use crate::{Event, SharedContext};

// ---

pub fn router() -> Router<SharedContext> {
    // ---
    Router::new()
        .route("/login", post(login))
        .route("/select", post(select))
        .route("/confirm", post(confirm))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectForm {
    sensor_id: Option<String>,
}

async fn login(
    State(context): State<SharedContext>,
    headers: HeaderMap,
    Json(form): Json<LoginForm>,
) -> Response {
    // ---
    info!("POST /login");
    let event = Event::Submit {
        password: form.password,
    };
    handle_event(context, &headers, event).await
}

async fn select(
    State(context): State<SharedContext>,
    headers: HeaderMap,
    Json(form): Json<SelectForm>,
) -> Response {
    // ---
    info!("POST /select {:?}", form.sensor_id);
    let event = Event::Select {
        sensor_id: form.sensor_id,
    };
    handle_event(context, &headers, event).await
}

async fn confirm(State(context): State<SharedContext>, headers: HeaderMap) -> Response {
    // ---
    info!("POST /confirm");
    handle_event(context, &headers, Event::Confirm).await
}

async fn logout(State(context): State<SharedContext>, headers: HeaderMap) -> Response {
    // ---
    info!("POST /logout");
    handle_event(context, &headers, Event::Logout).await
}
