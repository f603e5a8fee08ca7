//! Dispatch service — one UI event in, one report out.
//!
//! DESIGN
//! ======
//! Both transports (websocket frames and the HTTP update endpoint) funnel
//! into `handle_event`. The app lock is held for the full dispatch cycle,
//! including queueing the resulting `prop:patch` frame for every other
//! client. Queueing is `try_send` and never waits on a socket.
//!
//! Outside debug mode, callback failure messages are replaced with a generic
//! one before leaving the process; the full message is still logged.

use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::engine::{DispatchReport, Phase};
use crate::frame::Frame;
use crate::registry::RegistryError;
use crate::render::{self, Dependency};
use crate::services::session;
use crate::state::AppState;

const REDACTED_MESSAGE: &str = "callback failed";

/// A client-side interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UiEvent {
    /// `{"id": "button", "event": "click"}`
    Click { id: String, event: EventKind },
    /// `{"id": "user_input", "property": "value", "value": "..."}`
    Set {
        id: String,
        property: String,
        #[serde(default)]
        value: Value,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
}

impl UiEvent {
    #[must_use]
    pub fn click(id: impl Into<String>) -> Self {
        Self::Click { id: id.into(), event: EventKind::Click }
    }

    #[must_use]
    pub fn set(id: impl Into<String>, property: impl Into<String>, value: Value) -> Self {
        Self::Set { id: id.into(), property: property.into(), value }
    }
}

/// Run one event through the engine and push its patches to every connected
/// client except `origin`.
///
/// # Errors
///
/// Returns `UnknownBinding`/`UnknownProperty` if the event targets an
/// undeclared binding and `InvalidValue` for a rejected click counter.
/// Nothing is written or broadcast in those cases.
pub async fn handle_event(
    state: &AppState,
    event: UiEvent,
    origin: Option<Uuid>,
) -> Result<DispatchReport, RegistryError> {
    let report = {
        let mut app = state.app.lock().await;
        let report = match &event {
            UiEvent::Click { id, .. } => app.click(id)?,
            UiEvent::Set { id, property, value } => app.on_property_changed(id, property, value.clone())?,
        };
        debug_assert_eq!(app.engine().phase(), Phase::Idle);

        // Peers must see cycles in dispatch order: fan out before unlocking.
        session::broadcast(state, &Frame::patches(&report.patches, origin), origin).await;
        report
    };

    info!(
        event = ?event,
        patches = report.patches.len(),
        errors = report.errors.len(),
        invoked = report.invoked,
        "dispatch: event handled"
    );
    Ok(redact(report, state.debug))
}

/// Current layout snapshot.
pub async fn layout(state: &AppState) -> Value {
    let app = state.app.lock().await;
    render::layout(app.tree(), app.engine().registry())
}

/// Declared callbacks.
pub async fn dependencies(state: &AppState) -> Vec<Dependency> {
    let app = state.app.lock().await;
    render::dependencies(app.engine().graph())
}

fn redact(mut report: DispatchReport, debug: bool) -> DispatchReport {
    if !debug {
        for err in &mut report.errors {
            REDACTED_MESSAGE.clone_into(&mut err.message);
        }
    }
    report
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
