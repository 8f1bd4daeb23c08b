//! Drawing service: the server-held history.
//!
//! The history uses the same `ElementStore` as clients, so an
//! `element-update` for an existing id replaces it in place and element
//! kinds this build does not understand are stored and replayed verbatim.
//!
//! Every change is relayed to peers while the write lock that made it is
//! still held. Two racing senders therefore reach every peer in the same
//! order they reached the history, and a newcomer's `load-drawing` matches
//! what existing clients hold.

use canvas::doc::{StoredElement, Upserted};
use frames::{Event, Frame};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Record a created or updated element and relay it to everyone but
/// `sender`. The relayed payload is the element as stored. Returns `None`,
/// with nothing stored, if the element cannot be serialized.
pub async fn apply_element(state: &AppState, sender: Uuid, element: StoredElement) -> Option<Upserted> {
    let id = element.id().clone();
    let data = match serde_json::to_value(&element) {
        Ok(data) => data,
        Err(e) => {
            warn!(%id, error = %e, "drawing: failed to serialize element");
            return None;
        }
    };

    let mut room = state.room.write().await;
    let outcome = room.history.upsert(element);
    room.fan_out(&Frame::new(Event::ElementUpdate, data), Some(sender));
    debug!(%id, ?outcome, "drawing: element recorded");
    Some(outcome)
}

/// Forget every element and tell everyone but `sender`.
pub async fn clear(state: &AppState, sender: Uuid) {
    let mut room = state.room.write().await;
    let dropped = room.history.len();
    room.history.clear();
    room.fan_out(&Frame::signal(Event::ClearCanvas), Some(sender));
    debug!(dropped, "drawing: history cleared");
}

/// Snapshot of the history in draw order.
pub async fn history(state: &AppState) -> Vec<StoredElement> {
    state.room.read().await.history.elements().to_vec()
}

#[cfg(test)]
#[path = "drawing_test.rs"]
mod tests;
