//! Room service: membership and fan-out.
//!
//! DESIGN
//! ======
//! Each connection registers a bounded sender when it joins. Broadcasts hold
//! the room lock only long enough to `try_send` to every peer; a peer whose
//! queue is full or closed misses that frame rather than stalling the room.
//! History changes fan out from the drawing service instead, under the
//! write lock that changed the history.

use canvas::doc::StoredElement;
use canvas::presence::User;
use frames::Frame;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use super::presence;
use crate::state::AppState;

/// What a newly joined connection needs to render the room.
#[derive(Debug, Clone)]
pub struct Welcome {
    /// The identity assigned to the connection.
    pub user: User,
    /// Everyone in the room, including `user`.
    pub users: Vec<User>,
    /// The drawing history in draw order.
    pub history: Vec<StoredElement>,
}

/// Register a connection and assign it an identity.
pub async fn join(state: &AppState, client_id: Uuid, tx: mpsc::Sender<Frame>) -> Welcome {
    let user = presence::new_user(client_id);
    let mut room = state.room.write().await;
    room.clients.insert(client_id, tx);
    room.users.insert(client_id, user.clone());
    info!(%client_id, username = %user.username, clients = room.clients.len(), "room: client joined");

    Welcome { user, users: room.user_list(), history: room.history.elements().to_vec() }
}

/// Unregister a connection. Returns its user record if it was present.
pub async fn leave(state: &AppState, client_id: Uuid) -> Option<User> {
    let mut room = state.room.write().await;
    room.clients.remove(&client_id);
    let user = room.users.remove(&client_id);
    info!(%client_id, remaining = room.clients.len(), "room: client left");
    user
}

/// Send `frame` to every connection except `exclude`.
pub async fn broadcast(state: &AppState, frame: &Frame, exclude: Option<Uuid>) {
    state.room.read().await.fan_out(frame, exclude);
}

#[cfg(test)]
#[path = "room_test.rs"]
mod tests;
