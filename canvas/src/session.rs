//! Session: the top-level object a host holds for one connection.
//!
//! DESIGN
//! ======
//! A `Session` owns the [`EngineCore`], the injected [`SyncClient`], and the
//! change [`Observers`]. Pointer and UI events go through the engine; the
//! actions it returns are forwarded to the sync client and then announced to
//! observers. Inbound frames are decoded by the sync client, applied to the
//! engine, and announced the same way. Each effective mutation notifies
//! once for every part of the state it changed.
//!
//! ERROR HANDLING
//! ==============
//! Outbound failures are logged and never roll back local state: the local
//! canvas always reflects what the user drew. Inbound problems are dropped
//! by the sync client. The only error surfaced to callers is a frame that is
//! not valid JSON, from [`Session::handle_text`].

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use frames::{CodecError, Frame, decode_frame};
use tracing::{debug, info, warn};

use crate::doc::StoredElement;
use crate::engine::{Action, EngineCore};
use crate::input::{GestureState, Point, Tool, ToolSettings};
use crate::observer::{Change, Observers, SubscriptionId};
use crate::presence::{PresenceRoster, User};
use crate::render::{DrawCommand, draw_list};
use crate::sync::{SyncClient, Transport};

/// One drawing session over a transport.
#[derive(Debug)]
pub struct Session<T> {
    core: EngineCore,
    sync: SyncClient<T>,
    observers: Observers,
}

impl<T: Transport> Session<T> {
    /// Create a session over `transport`. Nothing is exchanged until
    /// [`init`](Self::init).
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { core: EngineCore::new(), sync: SyncClient::new(transport), observers: Observers::new() }
    }

    // --- Lifecycle ---

    /// Start the session.
    pub fn init(&mut self) {
        self.sync.init();
        info!("session: initialized");
    }

    /// End the session: detach from the transport, drop any in-flight
    /// gesture, and forget presence. Drawn elements are kept.
    pub fn teardown(&mut self) {
        self.sync.teardown();
        self.core.cancel_gesture();

        let had_presence = !self.core.roster.is_empty();
        let had_identity = self.core.roster.local().is_some();
        self.core.roster.reset();
        if had_presence {
            self.observers.notify(Change::Presence);
        }
        if had_identity {
            self.observers.notify(Change::Identity);
        }
        info!("session: torn down");
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.sync.is_attached()
    }

    // --- Inbound ---

    /// Apply one inbound frame.
    pub fn handle_frame(&mut self, frame: &Frame) {
        let Some(inbound) = self.sync.decode(frame) else {
            return;
        };
        for change in self.core.apply_inbound(inbound) {
            self.observers.notify(change);
        }
    }

    /// Decode and apply one inbound text message.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if `text` is not a frame.
    pub fn handle_text(&mut self, text: &str) -> Result<(), CodecError> {
        let frame = decode_frame(text)?;
        self.handle_frame(&frame);
        Ok(())
    }

    // --- Pointer input ---

    pub fn pointer_down(&mut self, pt: Point) {
        let actions = self.core.on_pointer_down(pt);
        self.dispatch(actions);
    }

    pub fn pointer_move(&mut self, pt: Point) {
        let actions = self.core.on_pointer_move(pt);
        self.dispatch(actions);
    }

    pub fn pointer_up(&mut self) {
        let actions = self.core.on_pointer_up();
        self.dispatch(actions);
    }

    // --- Commands ---

    /// Clear the canvas locally and for every peer.
    pub fn clear_canvas(&mut self) {
        let actions = self.core.clear();
        self.dispatch(actions);
    }

    /// Rename the local user and tell the server.
    pub fn rename(&mut self, username: &str) {
        let actions = self.core.rename(username);
        self.dispatch(actions);
    }

    // --- Tool settings ---

    pub fn set_tool(&mut self, tool: Tool) {
        self.core.set_tool(tool);
    }

    pub fn set_stroke_color(&mut self, color: impl Into<String>) {
        self.core.settings.stroke_color = color.into();
    }

    /// Set the stroke width, clamped to the allowed range.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.core.settings.set_stroke_width(width);
    }

    pub fn set_fill_color(&mut self, color: impl Into<String>) {
        self.core.settings.fill_color = color.into();
    }

    // --- Observers ---

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(Change) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    /// Remove a change listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // --- Queries ---

    #[must_use]
    pub fn elements(&self) -> &[StoredElement] {
        self.core.elements()
    }

    #[must_use]
    pub fn roster(&self) -> &PresenceRoster {
        &self.core.roster
    }

    #[must_use]
    pub fn identity(&self) -> Option<&User> {
        self.core.identity()
    }

    /// The current draw list, in store order.
    #[must_use]
    pub fn draw_list(&self) -> Vec<DrawCommand<'_>> {
        draw_list(self.core.elements())
    }

    #[must_use]
    pub fn settings(&self) -> &ToolSettings {
        &self.core.settings
    }

    #[must_use]
    pub fn gesture(&self) -> &GestureState {
        &self.core.input
    }

    // --- Internal ---

    fn dispatch(&mut self, actions: Vec<Action>) {
        for action in actions {
            if self.is_active() {
                let sent = match &action {
                    Action::ElementChanged(element) => self.sync.send_element(element),
                    Action::CanvasCleared => self.sync.send_clear(),
                    Action::UsernameChanged(username) => self.sync.send_rename(username),
                };
                if let Err(e) = sent {
                    warn!(error = %e, "session: failed to send change");
                }
            } else {
                debug!("session: not initialized, change kept locally");
            }

            // A rename before identity arrives changes nothing locally.
            if matches!(action, Action::UsernameChanged(_)) && self.core.identity().is_none() {
                continue;
            }
            self.observers.notify(action.change());
        }
    }
}
