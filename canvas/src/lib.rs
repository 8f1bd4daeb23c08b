//! Collaborative drawing state engine.
//!
//! This crate is the client-side core of the shared canvas. It owns the
//! in-memory model of drawable elements, the per-gesture state machine that
//! turns pointer input into element geometry, and the reconciliation of
//! locally drawn and remotely received updates into one ordered collection.
//! Rendering, widgets and the socket itself live outside: the host feeds
//! pointer events and inbound frames in, pumps outbound frames to the wire,
//! and subscribes to change notifications to know when to redraw.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Top-level [`session::Session`] wiring engine, sync client and observers |
//! | [`engine`] | Testable [`engine::EngineCore`]: gestures and inbound application |
//! | [`doc`] | Element types and the ordered [`doc::ElementStore`] |
//! | [`presence`] | Connected users and local identity |
//! | [`input`] | Tools, tool settings and the gesture state |
//! | [`sync`] | Transport seam and the [`sync::SyncClient`] message adapter |
//! | [`observer`] | Change notifications for the view layer |
//! | [`render`] | Draw list handed to the renderer |
//! | [`consts`] | Shared defaults and limits |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod input;
pub mod observer;
pub mod presence;
pub mod render;
pub mod session;
pub mod sync;
