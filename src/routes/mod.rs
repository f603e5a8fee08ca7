//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the layout snapshot, the dependency list, the HTTP
//! update endpoint and the websocket. Rendering happens in the browser; the
//! server only ever answers with JSON.

pub mod dash;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/_dash-layout", get(dash::layout))
        .route("/_dash-dependencies", get(dash::dependencies))
        .route("/_dash-update-component", post(dash::update_component))
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
