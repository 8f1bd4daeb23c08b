//! Shared frame model and JSON codec for the realtime drawing channel.
//!
//! This crate owns the wire representation used by both the relay server and
//! canvas clients. Every message is an event name plus an arbitrary JSON
//! payload, sent as one WebSocket text message:
//!
//! ```json
//! { "event": "element-update", "data": { "id": "…", "type": "line", … } }
//! ```
//!
//! The event name is kept as a plain string so that frames carrying events
//! this build does not know about still decode; deciding what to do with an
//! unknown event is the receiver's business, not the codec's.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error returned by [`encode_frame`] and [`decode_frame`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not a JSON frame envelope.
    #[error("failed to decode frame: {0}")]
    Decode(#[source] serde_json::Error),
    /// The frame could not be serialized.
    #[error("failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Every event name exchanged on the drawing channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Server → client: the receiving connection's own identity.
    CurrentUserInfo,
    /// Server → client: the full presence roster.
    ActiveUsersList,
    /// Server → client: a user joined.
    UserConnected,
    /// Server → client: a user's display metadata changed.
    UserUpdated,
    /// Server → client: a user left; payload is the user id.
    UserDisconnected,
    /// Server → client: the full ordered drawing history.
    LoadDrawing,
    /// Both directions: one element was created or changed.
    ElementUpdate,
    /// Both directions: every element was removed.
    ClearCanvas,
    /// Client → server: the sender's new username.
    UpdateUsername,
}

impl Event {
    /// All events, in protocol-table order.
    pub const ALL: [Self; 9] = [
        Self::CurrentUserInfo,
        Self::ActiveUsersList,
        Self::UserConnected,
        Self::UserUpdated,
        Self::UserDisconnected,
        Self::LoadDrawing,
        Self::ElementUpdate,
        Self::ClearCanvas,
        Self::UpdateUsername,
    ];

    /// Wire name of the event.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentUserInfo => "current-user-info",
            Self::ActiveUsersList => "active-users-list",
            Self::UserConnected => "user-connected",
            Self::UserUpdated => "user-updated",
            Self::UserDisconnected => "user-disconnected",
            Self::LoadDrawing => "load-drawing",
            Self::ElementUpdate => "element-update",
            Self::ClearCanvas => "clear-canvas",
            Self::UpdateUsername => "update-username",
        }
    }

    /// Parse a wire name. Returns `None` for names outside the vocabulary.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.as_str() == name)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message on the drawing channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name, e.g. `"element-update"`.
    pub event: String,
    /// Event payload. `null` for events that carry none.
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    /// Create a frame for a known event.
    #[must_use]
    pub fn new(event: Event, data: Value) -> Self {
        Self { event: event.as_str().to_owned(), data }
    }

    /// Create a payload-less frame (e.g. `clear-canvas`).
    #[must_use]
    pub fn signal(event: Event) -> Self {
        Self::new(event, Value::Null)
    }

    /// The known event this frame carries, if any.
    #[must_use]
    pub fn kind(&self) -> Option<Event> {
        Event::parse(&self.event)
    }

    /// Whether this frame carries the given event.
    #[must_use]
    pub fn is(&self, event: Event) -> bool {
        self.event == event.as_str()
    }
}

/// Encode a frame as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if the payload cannot be serialized.
pub fn encode_frame(frame: &Frame) -> Result<String, CodecError> {
    serde_json::to_string(frame).map_err(CodecError::Encode)
}

/// Decode JSON text into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] when the text is not valid JSON or lacks an
/// `event` string.
pub fn decode_frame(text: &str) -> Result<Frame, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Decode)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
