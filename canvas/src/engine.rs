//! Engine core: the gesture state machine and inbound reconciliation.
//!
//! `EngineCore` holds all drawing state and none of the I/O. Pointer handlers
//! mutate the store and return [`Action`]s describing what the host must
//! tell peers; inbound messages are applied with [`EngineCore::apply_inbound`]
//! and report which part of the state changed. [`crate::session::Session`]
//! wires both ends to the sync client and observers.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::debug;

use crate::consts::MAX_USERNAME_CHARS;
use crate::doc::{Element, ElementId, ElementStore, StoredElement};
use crate::input::{GestureState, Point, Tool, ToolSettings};
use crate::observer::Change;
use crate::presence::{PresenceRoster, User};
use crate::sync::Inbound;

/// Actions returned from local handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A local gesture created or grew this element; sync it to peers.
    ElementChanged(Element),
    /// The canvas was cleared locally.
    CanvasCleared,
    /// The local user typed a new name.
    UsernameChanged(String),
}

impl Action {
    /// The state this action changed.
    #[must_use]
    pub fn change(&self) -> Change {
        match self {
            Self::ElementChanged(_) | Self::CanvasCleared => Change::Elements,
            Self::UsernameChanged(_) => Change::Identity,
        }
    }
}

/// Core engine state: everything that does not depend on the transport.
#[derive(Debug, Clone, Default)]
pub struct EngineCore {
    pub doc: ElementStore,
    pub roster: PresenceRoster,
    pub settings: ToolSettings,
    pub input: GestureState,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Apply one inbound message. Returns the parts of the state that
    /// changed; empty when the message had no effect.
    ///
    /// A `user-updated` echo for the local user also replaces the local
    /// identity, so names the server normalized win over what was typed.
    pub fn apply_inbound(&mut self, inbound: Inbound) -> Vec<Change> {
        match inbound {
            Inbound::CurrentUserInfo(user) => {
                self.roster.set_local(user);
                vec![Change::Identity]
            }
            Inbound::ActiveUsers(users) => {
                self.roster.set_all(users);
                vec![Change::Presence]
            }
            Inbound::UserConnected(user) | Inbound::UserUpdated(user) => {
                let identity = self.roster.is_local(&user.id) && self.roster.local() != Some(&user);
                if identity {
                    self.roster.set_local(user.clone());
                }
                self.roster.upsert(user);
                if identity { vec![Change::Presence, Change::Identity] } else { vec![Change::Presence] }
            }
            Inbound::UserDisconnected(id) => {
                self.roster.remove(&id).map(|_| Change::Presence).into_iter().collect()
            }
            Inbound::LoadDrawing(history) => {
                self.load_history(history);
                vec![Change::Elements]
            }
            Inbound::ElementUpdate(element) => {
                self.doc.upsert(element);
                vec![Change::Elements]
            }
            Inbound::ClearCanvas => {
                self.doc.clear();
                vec![Change::Elements]
            }
        }
    }

    /// Replace the store with a full history. An in-flight gesture is left
    /// alone; if its element is not in `history`, later moves are no-ops.
    pub fn load_history(&mut self, history: Vec<StoredElement>) {
        self.doc.replace_all(history);
        if let Some(id) = self.input.active_id()
            && !self.doc.contains(id)
        {
            debug!(%id, "engine: history replaced the element being drawn");
        }
    }

    // --- Tool settings ---

    /// Set the active tool. Takes effect at the next pointer-down.
    pub fn set_tool(&mut self, tool: Tool) {
        self.settings.tool = tool;
    }

    // --- Input events ---

    /// Start a gesture: create the seed element for the current tool.
    ///
    /// A pointer-down during an active gesture first ends that gesture, as a
    /// pointer-up would, then starts a new one.
    pub fn on_pointer_down(&mut self, pt: Point) -> Vec<Action> {
        if let GestureState::Drawing { id, .. } = &self.input {
            debug!(%id, "engine: pointer-down during gesture, finishing previous element");
        }

        let id = ElementId::generate();
        let element = Element::begin(id.clone(), &self.settings, self.roster.local(), pt);
        self.input = GestureState::Drawing { tool: self.settings.tool, id, start: pt };
        self.doc.upsert(element.clone());
        vec![Action::ElementChanged(element)]
    }

    /// Grow the active element toward `pt`.
    ///
    /// No-op without an active gesture, or when the active element is no
    /// longer in the store (cleared or replaced by a history load).
    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        let GestureState::Drawing { id, start, .. } = &self.input else {
            return Vec::new();
        };
        let Some(existing) = self.doc.get_known(id) else {
            debug!(%id, "engine: active element is gone, ignoring move");
            return Vec::new();
        };

        let mut element = existing.clone();
        element.reshape(*start, pt);
        self.doc.upsert(element.clone());
        vec![Action::ElementChanged(element)]
    }

    /// End the gesture. Nothing is sent: the last move already carried the
    /// final geometry.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.input = GestureState::Idle;
        Vec::new()
    }

    /// Abandon any in-flight gesture without touching the store.
    pub fn cancel_gesture(&mut self) {
        self.input = GestureState::Idle;
    }

    // --- Local commands ---

    /// Remove every element locally.
    pub fn clear(&mut self) -> Vec<Action> {
        self.doc.clear();
        vec![Action::CanvasCleared]
    }

    /// Rename the local user, capped at [`MAX_USERNAME_CHARS`] characters.
    pub fn rename(&mut self, username: &str) -> Vec<Action> {
        let username: String = username.chars().take(MAX_USERNAME_CHARS).collect();
        if !self.roster.rename_local(&username) {
            debug!("engine: rename before identity is known");
        }
        vec![Action::UsernameChanged(username)]
    }

    // --- Queries ---

    /// Every entry in draw order.
    #[must_use]
    pub fn elements(&self) -> &[StoredElement] {
        self.doc.elements()
    }

    /// The local identity, once assigned.
    #[must_use]
    pub fn identity(&self) -> Option<&User> {
        self.roster.local()
    }
}
