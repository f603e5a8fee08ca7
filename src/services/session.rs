//! Session service — connected websocket clients and fan-out.

use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::frame::Frame;
use crate::state::AppState;

/// Track a newly connected client.
pub async fn connect(state: &AppState, client_id: Uuid, tx: mpsc::Sender<Frame>) {
    let mut clients = state.clients.write().await;
    clients.insert(client_id, tx);
    info!(%client_id, connected = clients.len(), "client joined");
}

/// Forget a client. Idempotent.
pub async fn disconnect(state: &AppState, client_id: Uuid) {
    let mut clients = state.clients.write().await;
    if clients.remove(&client_id).is_some() {
        info!(%client_id, remaining = clients.len(), "client left");
    }
}

/// Send `frame` to every client except `exclude`.
pub async fn broadcast(state: &AppState, frame: &Frame, exclude: Option<Uuid>) {
    let clients = state.clients.read().await;
    for (client_id, tx) in clients.iter() {
        if exclude == Some(*client_id) {
            continue;
        }
        // Best-effort: if a client's channel is full, skip it.
        let _ = tx.try_send(frame.clone());
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
