//! Presence: who is connected, and who "we" are.
//!
//! The roster mirrors the server's view of connected users and is rebuilt
//! from broadcasts only. The local identity arrives through its own
//! notification and is tracked separately; the local user also appears in
//! the roster like any other user once the server lists it.

#[cfg(test)]
#[path = "presence_test.rs"]
mod presence_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Server-assigned user identifier, stable for one connection.
pub type UserId = String;

/// A connected user as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// User-editable display name.
    pub username: String,
    /// Presence color, assigned once per connection.
    pub color: String,
}

/// Connected users keyed by id, plus the local identity.
#[derive(Debug, Clone, Default)]
pub struct PresenceRoster {
    users: HashMap<UserId, User>,
    local: Option<User>,
}

impl PresenceRoster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole roster. The local identity is kept.
    pub fn set_all(&mut self, users: Vec<User>) {
        self.users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
    }

    /// Add a user or replace their metadata.
    pub fn upsert(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    /// Remove a user, returning them if they were present.
    pub fn remove(&mut self, id: &str) -> Option<User> {
        self.users.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.users.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Users in a stable display order: by username, then id.
    #[must_use]
    pub fn sorted(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username).then_with(|| a.id.cmp(&b.id)));
        users
    }

    // --- Local identity ---

    /// Record the identity the server assigned to this connection.
    pub fn set_local(&mut self, user: User) {
        self.local = Some(user);
    }

    /// The local identity, once known.
    #[must_use]
    pub fn local(&self) -> Option<&User> {
        self.local.as_ref()
    }

    /// Whether `id` is the local user.
    #[must_use]
    pub fn is_local(&self, id: &str) -> bool {
        self.local.as_ref().is_some_and(|u| u.id == id)
    }

    /// Change the local username. The roster entry is left for the server's
    /// `user-updated` broadcast to refresh. Returns `false` when no identity
    /// has arrived yet.
    pub fn rename_local(&mut self, username: &str) -> bool {
        let Some(local) = self.local.as_mut() else {
            return false;
        };
        username.clone_into(&mut local.username);
        true
    }

    /// Forget the local identity and every user (session teardown).
    pub fn reset(&mut self) {
        self.users.clear();
        self.local = None;
    }
}
