//! WebSocket handler — property events in, patches out.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID and enters a `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall prefix
//! - Patch frames queued by other clients' events → forward to client
//!
//! Every inbound frame gets exactly one answer: a `done` reply, an `error`
//! reply, or a `gateway:error` when the text is not a frame. Fan-out to peers
//! happens inside the dispatch service, not here.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id`
//! 2. Client sends `prop:set` / `prop:click` / `layout:get`
//! 3. Sender gets the dispatch report; peers get `prop:patch`
//! 4. Close → forget client

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::DispatchReport;
use crate::frame::{Data, FRAME_CODE, FRAME_MESSAGE, Frame, ProtocolError, Status};
use crate::services;
use crate::services::dispatch::UiEvent;
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for patch frames caused by other clients.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(256);

    if send_frame(&mut socket, &Frame::connected(client_id)).await.is_err() {
        return;
    }

    services::session::connect(&state, client_id, client_tx).await;
    info!(%client_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let reply = process_inbound_text(&state, client_id, &text).await;
                        let _ = send_frame(&mut socket, &reply).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    services::session::disconnect(&state, client_id).await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse one inbound text message and produce the frame to send back.
async fn process_inbound_text(state: &AppState, client_id: Uuid, text: &str) -> Frame {
    let mut req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            return Frame::rejected(&ProtocolError::InvalidFrame(e.to_string()));
        }
    };

    req.from = Some(client_id.to_string());
    info!(%client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");

    let result = match req.prefix() {
        "prop" => handle_prop(state, client_id, &req).await,
        "layout" => handle_layout(state, &req).await,
        _ => Err(unknown_syscall(&req)),
    };

    match result {
        Ok(data) => req.done_with(data),
        Err(err_frame) => err_frame,
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn handle_prop(state: &AppState, client_id: Uuid, req: &Frame) -> Result<Data, Frame> {
    let event = match req.op() {
        "set" => {
            let value = req.data.get("value").cloned().unwrap_or_default();
            UiEvent::set(field(req, "id")?, field(req, "property")?, value)
        }
        "click" => UiEvent::click(field(req, "id")?),
        _ => return Err(unknown_syscall(req)),
    };

    let report = services::dispatch::handle_event(state, event, Some(client_id))
        .await
        .map_err(|e| req.error_from(&e))?;
    Ok(report_data(&report))
}

async fn handle_layout(state: &AppState, req: &Frame) -> Result<Data, Frame> {
    if req.op() != "get" {
        return Err(unknown_syscall(req));
    }
    let mut data = Data::new();
    data.insert("layout".into(), services::dispatch::layout(state).await);
    data.insert("dependencies".into(), json!(services::dispatch::dependencies(state).await));
    Ok(data)
}

fn report_data(report: &DispatchReport) -> Data {
    let mut data = Data::new();
    data.insert("patches".into(), json!(report.patches));
    data.insert("errors".into(), json!(report.errors));
    data.insert("invoked".into(), json!(report.invoked));
    data
}

// =============================================================================
// HELPERS
// =============================================================================

fn field<'a>(req: &'a Frame, key: &'static str) -> Result<&'a str, Frame> {
    req.field(key).map_err(|e| req.error_from(&e))
}

fn unknown_syscall(req: &Frame) -> Frame {
    req.error_from(&ProtocolError::UnknownSyscall(req.syscall.clone()))
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == Status::Error {
        let code = frame.data.get(FRAME_CODE).and_then(|v| v.as_str()).unwrap_or("-");
        let message = frame.data.get(FRAME_MESSAGE).and_then(|v| v.as_str()).unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
