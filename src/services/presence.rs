//! Presence service: default identities and username changes.
//!
//! Every connection gets a guest name and a presence color when it joins.
//! Users may rename themselves at any time; colors never change for the
//! lifetime of a connection.

use canvas::presence::User;
use rand::Rng;
use rand::seq::IndexedRandom;
use uuid::Uuid;

use crate::state::AppState;

/// Presence colors handed out to new connections.
pub const PALETTE: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E9",
];

const FALLBACK_COLOR: &str = PALETTE[0];

/// Generate a `Guest-NNNN` display name.
#[must_use]
pub fn guest_name() -> String {
    let n: u16 = rand::rng().random_range(1000..10_000);
    format!("Guest-{n}")
}

/// Pick a presence color at random.
#[must_use]
pub fn pick_color() -> String {
    PALETTE.choose(&mut rand::rng()).copied().unwrap_or(FALLBACK_COLOR).to_owned()
}

/// Build the identity for a new connection.
#[must_use]
pub fn new_user(client_id: Uuid) -> User {
    User { id: client_id.to_string(), username: guest_name(), color: pick_color() }
}

/// Normalize a requested username: trim, then cap at `max_chars`
/// characters. Returns `None` when nothing is left.
#[must_use]
pub fn sanitize_username(raw: &str, max_chars: usize) -> Option<String> {
    let name: String = raw.trim().chars().take(max_chars).collect();
    let name = name.trim_end();
    if name.is_empty() { None } else { Some(name.to_owned()) }
}

/// Apply a rename request from `client_id`.
///
/// Returns the user's updated record. An empty name keeps the previous one,
/// and the unchanged record is still returned so the sender's input can be
/// reconciled. Returns `None` if the client is not in the room.
pub async fn rename(state: &AppState, client_id: Uuid, raw: &str) -> Option<User> {
    let max_chars = state.config.max_username_chars;
    let mut room = state.room.write().await;
    let user = room.users.get_mut(&client_id)?;
    if let Some(name) = sanitize_username(raw, max_chars) {
        user.username = name;
    }
    Some(user.clone())
}

#[cfg(test)]
#[path = "presence_test.rs"]
mod tests;
