//! Sync client: translation between core mutations and transport frames.
//!
//! DESIGN
//! ======
//! The socket itself is external. The core only needs somewhere to put
//! outbound frames, expressed by the [`Transport`] trait; inbound frames are
//! pushed in by the host through [`SyncClient::decode`]. The client is owned
//! by the session and has an explicit `init` / `teardown` lifecycle in place
//! of registering and unregistering event listeners.
//!
//! ERROR HANDLING
//! ==============
//! Inbound problems never surface as errors: unknown event kinds are dropped
//! at `debug`, malformed payloads at `warn`. Outbound failures are returned
//! to the caller; there is no retry here, delivery is the transport's job.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use frames::{Event, Frame};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::doc::{Element, StoredElement};
use crate::presence::{User, UserId};

// =============================================================================
// TRANSPORT
// =============================================================================

/// Error returned by a [`Transport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The other end of the transport is gone.
    #[error("transport closed")]
    Closed,
}

/// Outbound half of the realtime channel.
pub trait Transport {
    /// Queue one frame for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] when the frame can no longer be
    /// delivered.
    fn send(&mut self, frame: Frame) -> Result<(), TransportError>;
}

/// Transport that hands frames to an unbounded channel. The host drains the
/// receiver into the real socket.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Frame>,
}

impl ChannelTransport {
    /// Create a transport and the receiver the host should pump.
    #[must_use]
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        self.tx.send(frame).map_err(|_| TransportError::Closed)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error returned by outbound [`SyncClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
    /// `send_*` was called before `init` or after `teardown`.
    #[error("sync client is not initialized")]
    Detached,
}

// =============================================================================
// INBOUND
// =============================================================================

/// A recognized inbound message, decoded and ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// `current-user-info`: the local identity.
    CurrentUserInfo(User),
    /// `active-users-list`: replace the roster.
    ActiveUsers(Vec<User>),
    /// `user-connected`: roster upsert.
    UserConnected(User),
    /// `user-updated`: roster upsert.
    UserUpdated(User),
    /// `user-disconnected`: roster removal.
    UserDisconnected(UserId),
    /// `load-drawing`: replace the store.
    LoadDrawing(Vec<StoredElement>),
    /// `element-update`: store upsert.
    ElementUpdate(StoredElement),
    /// `clear-canvas`: empty the store.
    ClearCanvas,
}

/// Decode a frame into an [`Inbound`] message.
///
/// Returns `None` for events that are unknown or only ever sent by clients,
/// and for payloads that do not match the event's shape. `load-drawing`
/// entries are decoded one by one; entries that fail are dropped and the
/// rest keep their order.
#[must_use]
pub fn decode_inbound(frame: &Frame) -> Option<Inbound> {
    let Some(event) = frame.kind() else {
        debug!(event = %frame.event, "sync: dropping unknown event");
        return None;
    };

    match event {
        Event::CurrentUserInfo => payload(event, &frame.data).map(Inbound::CurrentUserInfo),
        Event::ActiveUsersList => payload(event, &frame.data).map(Inbound::ActiveUsers),
        Event::UserConnected => payload(event, &frame.data).map(Inbound::UserConnected),
        Event::UserUpdated => payload(event, &frame.data).map(Inbound::UserUpdated),
        Event::UserDisconnected => payload(event, &frame.data).map(Inbound::UserDisconnected),
        Event::LoadDrawing => decode_history(&frame.data).map(Inbound::LoadDrawing),
        Event::ElementUpdate => payload(event, &frame.data).map(Inbound::ElementUpdate),
        Event::ClearCanvas => Some(Inbound::ClearCanvas),
        Event::UpdateUsername => {
            debug!(%event, "sync: ignoring client-only event");
            None
        }
    }
}

fn payload<T: DeserializeOwned>(event: Event, data: &Value) -> Option<T> {
    match T::deserialize(data) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(%event, error = %e, "sync: malformed payload");
            None
        }
    }
}

fn decode_history(data: &Value) -> Option<Vec<StoredElement>> {
    let Some(entries) = data.as_array() else {
        warn!(event = %Event::LoadDrawing, "sync: history is not an array");
        return None;
    };

    let mut history = Vec::with_capacity(entries.len());
    for (pos, entry) in entries.iter().enumerate() {
        match StoredElement::deserialize(entry) {
            Ok(element) => history.push(element),
            Err(e) => warn!(pos, error = %e, "sync: dropping malformed history entry"),
        }
    }
    Some(history)
}

// =============================================================================
// CLIENT
// =============================================================================

/// Adapter between the core and a [`Transport`].
#[derive(Debug)]
pub struct SyncClient<T> {
    transport: T,
    attached: bool,
}

impl<T: Transport> SyncClient<T> {
    /// Wrap a transport. The client starts detached; call [`init`](Self::init).
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport, attached: false }
    }

    /// Start exchanging messages.
    pub fn init(&mut self) {
        self.attached = true;
    }

    /// Stop exchanging messages. Inbound frames are ignored and outbound
    /// sends fail with [`SyncError::Detached`] until the next `init`.
    pub fn teardown(&mut self) {
        self.attached = false;
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    // --- Outbound ---

    /// Send a created or updated element.
    ///
    /// # Errors
    ///
    /// See [`SyncError`].
    pub fn send_element(&mut self, element: &Element) -> Result<(), SyncError> {
        let data = serde_json::to_value(element)?;
        self.send(Frame::new(Event::ElementUpdate, data))
    }

    /// Tell peers the canvas was cleared.
    ///
    /// # Errors
    ///
    /// See [`SyncError`].
    pub fn send_clear(&mut self) -> Result<(), SyncError> {
        self.send(Frame::signal(Event::ClearCanvas))
    }

    /// Send the local user's new name. Called on every edit, undebounced.
    ///
    /// # Errors
    ///
    /// See [`SyncError`].
    pub fn send_rename(&mut self, username: &str) -> Result<(), SyncError> {
        self.send(Frame::new(Event::UpdateUsername, Value::String(username.to_owned())))
    }

    fn send(&mut self, frame: Frame) -> Result<(), SyncError> {
        if !self.attached {
            return Err(SyncError::Detached);
        }
        self.transport.send(frame)?;
        Ok(())
    }

    // --- Inbound ---

    /// Decode an inbound frame, or `None` if it should be ignored.
    #[must_use]
    pub fn decode(&self, frame: &Frame) -> Option<Inbound> {
        if !self.attached {
            debug!(event = %frame.event, "sync: detached, ignoring inbound frame");
            return None;
        }
        decode_inbound(frame)
    }
}
