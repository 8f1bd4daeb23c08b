//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! The relay serves a single shared canvas, so it holds exactly one `Room`:
//! the connected users, one outbound sender per connection, and the drawing
//! history replayed to every newcomer. History lives only in memory and is
//! lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use canvas::doc::ElementStore;
use canvas::presence::User;
use frames::Frame;
use tokio::sync::{RwLock, mpsc};
use tracing::warn;
use uuid::Uuid;

use crate::config::ServerConfig;

// =============================================================================
// ROOM
// =============================================================================

/// Live state of the shared canvas.
#[derive(Debug, Default)]
pub struct Room {
    /// Connected users keyed by connection id. A user's id is the
    /// connection id rendered as text.
    pub users: HashMap<Uuid, User>,
    /// Connected clients: `client_id` -> sender for outgoing frames.
    pub clients: HashMap<Uuid, mpsc::Sender<Frame>>,
    /// Every element drawn since the canvas was last cleared, in draw order.
    pub history: ElementStore,
}

impl Room {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Users in join-independent display order.
    #[must_use]
    pub fn user_list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username).then_with(|| a.id.cmp(&b.id)));
        users
    }

    /// Queue `frame` for every client except `exclude`. Callers that also
    /// mutate the room do both under the same write guard, so the order
    /// peers receive frames matches the order of the history.
    pub fn fan_out(&self, frame: &Frame, exclude: Option<Uuid>) {
        for (client_id, tx) in &self.clients {
            if exclude == Some(*client_id) {
                continue;
            }
            if let Err(e) = tx.try_send(frame.clone()) {
                warn!(%client_id, event = %frame.event, error = %e, "room: dropping frame for slow or closed client");
            }
        }
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state. Clone is required by Axum; inner fields are
/// Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub room: Arc<RwLock<Room>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { room: Arc::new(RwLock::new(Room::new())), config: Arc::new(config) }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
