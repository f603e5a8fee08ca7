//! HTTP endpoints for layout, dependencies and property updates.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Map, Value};

use crate::engine::DispatchReport;
use crate::frame::{ErrorCode, FRAME_CODE, FRAME_MESSAGE};
use crate::registry::RegistryError;
use crate::render::Dependency;
use crate::services::dispatch::{self, UiEvent};
use crate::state::AppState;

/// `GET /_dash-layout` — tree snapshot with current values.
pub async fn layout(State(state): State<AppState>) -> Json<Value> {
    Json(dispatch::layout(&state).await)
}

/// `GET /_dash-dependencies` — declared callbacks.
pub async fn dependencies(State(state): State<AppState>) -> Json<Vec<Dependency>> {
    Json(dispatch::dependencies(&state).await)
}

/// `POST /_dash-update-component` — apply one UI event, return every patch.
/// Websocket clients receive the same patches as a `prop:patch` frame.
pub async fn update_component(
    State(state): State<AppState>,
    Json(event): Json<UiEvent>,
) -> Result<Json<DispatchReport>, (StatusCode, Json<Value>)> {
    dispatch::handle_event(&state, event, None)
        .await
        .map(Json)
        .map_err(|e| (registry_error_to_status(&e), Json(error_body(&e))))
}

fn registry_error_to_status(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::UnknownBinding(_) | RegistryError::UnknownProperty { .. } => StatusCode::NOT_FOUND,
        RegistryError::MalformedBinding(_) => StatusCode::BAD_REQUEST,
        RegistryError::InvalidValue { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn error_body(err: &(impl ErrorCode + ?Sized)) -> Value {
    let mut body = Map::new();
    body.insert(FRAME_CODE.into(), Value::String(err.error_code().to_string()));
    body.insert(FRAME_MESSAGE.into(), Value::String(err.to_string()));
    Value::Object(body)
}

#[cfg(test)]
#[path = "dash_test.rs"]
mod tests;
