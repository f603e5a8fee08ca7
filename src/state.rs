//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the one `App` behind a `tokio::sync::Mutex`: a UI event holds the
//! lock for its entire dispatch cycle, chained callbacks included, so no two
//! cycles interleave. Connected websocket clients are tracked separately so
//! broadcasting never waits on a running callback.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, mpsc};
use uuid::Uuid;

use crate::app::App;
use crate::frame::Frame;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Mutex<App>>,
    /// Connected clients: `client_id` -> sender for outgoing frames.
    pub clients: Arc<RwLock<HashMap<Uuid, mpsc::Sender<Frame>>>>,
    /// Send callback failure detail to clients instead of a generic message.
    pub debug: bool,
}

impl AppState {
    #[must_use]
    pub fn new(app: App, debug: bool) -> Self {
        Self { app: Arc::new(Mutex::new(app)), clients: Arc::new(RwLock::new(HashMap::new())), debug }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
