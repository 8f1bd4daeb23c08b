//! WebSocket handler: the drawing channel relay.
//!
//! DESIGN
//! ======
//! On upgrade, the connection joins the room and enters a `select!` loop:
//! - Incoming client frames -> parse + dispatch by event name
//! - Frames queued by peers' broadcasts -> forward to client
//!
//! Handler functions validate, mutate room state, and return an `Outcome`.
//! The dispatch layer owns outbound presence frames. History changes are the
//! exception: the drawing service relays them while it still holds the
//! write lock, so peers see them in history order.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade -> join room -> send `current-user-info`, `active-users-list`,
//!    `load-drawing`; broadcast `user-connected` to peers
//! 2. Client sends frames -> dispatch -> handler returns Outcome
//! 3. Dispatch applies Outcome (broadcast to everyone, or nothing when the
//!    handler already relayed)
//! 4. Close -> leave room -> broadcast `user-disconnected`
//!
//! ERROR HANDLING
//! ==============
//! Malformed or unexpected client frames are logged and ignored; the
//! protocol has no error reply.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use canvas::doc::StoredElement;
use frames::{CodecError, Event, Frame, decode_frame, encode_frame};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services;
use crate::services::room::Welcome;
use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. Handlers never send frames directly.
#[derive(Debug)]
enum Outcome {
    /// Send to every client including the sender.
    Broadcast(Frame),
    /// The handler changed the history and already relayed the change to
    /// peers under the same room lock.
    Relayed,
    /// Nothing to send.
    Ignore,
}

#[derive(Debug, thiserror::Error)]
enum SendError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("socket send failed: {0}")]
    Socket(#[from] axum::Error),
}

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

    // Per-connection channel for frames broadcast by peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.config.client_channel_capacity);

    let welcome = services::room::join(&state, client_id, client_tx).await;
    info!(%client_id, username = %welcome.user.username, "ws: client connected");

    if greet(&mut socket, &welcome).await {
        if let Some(joined) = to_frame(Event::UserConnected, &welcome.user) {
            services::room::broadcast(&state, &joined, Some(client_id)).await;
        }
        relay(&mut socket, &state, client_id, &mut client_rx).await;
    }

    if let Some(user) = services::room::leave(&state, client_id).await {
        let left = Frame::new(Event::UserDisconnected, Value::String(user.id));
        services::room::broadcast(&state, &left, None).await;
    }
    info!(%client_id, "ws: client disconnected");
}

/// Send the joining client its identity, the roster and the history, in
/// that order. Returns `false` if the socket failed.
async fn greet(socket: &mut WebSocket, welcome: &Welcome) -> bool {
    let frames = [
        to_frame(Event::CurrentUserInfo, &welcome.user),
        to_frame(Event::ActiveUsersList, &welcome.users),
        to_frame(Event::LoadDrawing, &welcome.history),
    ];
    for frame in frames.into_iter().flatten() {
        if let Err(e) = send_frame(socket, &frame).await {
            warn!(error = %e, event = %frame.event, "ws: greeting failed");
            return false;
        }
    }
    true
}

async fn relay(socket: &mut WebSocket, state: &AppState, client_id: Uuid, client_rx: &mut mpsc::Receiver<Frame>) {
    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let outcome = process_inbound_text(state, client_id, text.as_str()).await;
                        apply_outcome(state, outcome).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if let Err(e) = send_frame(socket, &frame).await {
                    debug!(%client_id, error = %e, "ws: send to client failed");
                    break;
                }
            }
        }
    }
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and handle one inbound text frame.
async fn process_inbound_text(state: &AppState, client_id: Uuid, text: &str) -> Outcome {
    let req = match decode_frame(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            return Outcome::Ignore;
        }
    };

    let Some(event) = req.kind() else {
        warn!(%client_id, event = %req.event, "ws: unknown event");
        return Outcome::Ignore;
    };

    // Element updates arrive once per pointer move.
    if event == Event::ElementUpdate {
        debug!(%client_id, %event, "ws: recv frame");
    } else {
        info!(%client_id, %event, "ws: recv frame");
    }

    match event {
        Event::ElementUpdate => handle_element_update(state, client_id, req.data).await,
        Event::ClearCanvas => {
            services::drawing::clear(state, client_id).await;
            Outcome::Relayed
        }
        Event::UpdateUsername => handle_update_username(state, client_id, &req.data).await,
        Event::CurrentUserInfo
        | Event::ActiveUsersList
        | Event::UserConnected
        | Event::UserUpdated
        | Event::UserDisconnected
        | Event::LoadDrawing => {
            warn!(%client_id, %event, "ws: client sent a server-only event");
            Outcome::Ignore
        }
    }
}

async fn apply_outcome(state: &AppState, outcome: Outcome) {
    match outcome {
        Outcome::Broadcast(frame) => services::room::broadcast(state, &frame, None).await,
        Outcome::Relayed | Outcome::Ignore => {}
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn handle_element_update(state: &AppState, client_id: Uuid, data: Value) -> Outcome {
    let element: StoredElement = match serde_json::from_value(data) {
        Ok(element) => element,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: malformed element");
            return Outcome::Ignore;
        }
    };
    match services::drawing::apply_element(state, client_id, element).await {
        Some(_) => Outcome::Relayed,
        None => Outcome::Ignore,
    }
}

async fn handle_update_username(state: &AppState, client_id: Uuid, data: &Value) -> Outcome {
    let Some(requested) = data.as_str() else {
        warn!(%client_id, "ws: update-username payload is not a string");
        return Outcome::Ignore;
    };
    let Some(user) = services::presence::rename(state, client_id, requested).await else {
        return Outcome::Ignore;
    };
    to_frame(Event::UserUpdated, &user).map_or(Outcome::Ignore, Outcome::Broadcast)
}

// =============================================================================
// HELPERS
// =============================================================================

fn to_frame(event: Event, payload: &impl Serialize) -> Option<Frame> {
    match serde_json::to_value(payload) {
        Ok(data) => Some(Frame::new(event, data)),
        Err(e) => {
            warn!(%event, error = %e, "ws: failed to serialize payload");
            None
        }
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), SendError> {
    let json = encode_frame(frame)?;
    if frame.is(Event::ElementUpdate) {
        debug!(event = %frame.event, "ws: send frame");
    } else {
        info!(event = %frame.event, "ws: send frame");
    }
    socket.send(Message::Text(json.into())).await?;
    Ok(())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
