//! Shared constants for the canvas crate.

// ── Tool defaults ───────────────────────────────────────────────

/// Stroke color a fresh session starts with.
pub const DEFAULT_STROKE_COLOR: &str = "#000000";

/// Fill color a fresh session starts with; shapes are hollow until changed.
pub const DEFAULT_FILL_COLOR: &str = "transparent";

/// Stroke width a fresh session starts with, in canvas pixels.
pub const DEFAULT_STROKE_WIDTH: f64 = 5.0;

/// Thinnest selectable stroke.
pub const MIN_STROKE_WIDTH: f64 = 1.0;

/// Thickest selectable stroke.
pub const MAX_STROKE_WIDTH: f64 = 20.0;

// ── Rendering ───────────────────────────────────────────────────

/// Canvas background color. Eraser strokes are painted in this color.
pub const ERASER_COLOR: &str = "#f5f5f5";

// ── Presence ────────────────────────────────────────────────────

/// Longest username (in characters) the client will send.
pub const MAX_USERNAME_CHARS: usize = 20;
