//! Input model: tools, tool settings, pointer positions, and the gesture state.
//!
//! `Tool` and `ToolSettings` capture what the user has picked in the toolbar
//! at the moment a gesture starts. `GestureState` is the active gesture being
//! tracked between pointer-down and pointer-up; it carries only the context
//! needed to grow the element that the gesture created.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FILL_COLOR, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, MAX_STROKE_WIDTH, MIN_STROKE_WIDTH,
};
use crate::doc::ElementId;

/// Which drawing tool is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Free-hand stroke (default).
    #[default]
    Pen,
    /// Free-hand stroke composited as a cut-out.
    Eraser,
    /// Axis-aligned rectangle dragged from one corner.
    Rect,
    /// Circle dragged out from its center.
    Circle,
}

impl Tool {
    /// Wire name of the tool.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pen => "pen",
            Self::Eraser => "eraser",
            Self::Rect => "rect",
            Self::Circle => "circle",
        }
    }
}

/// A position in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Toolbar state applied to every element a gesture creates.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    /// Currently active tool.
    pub tool: Tool,
    /// Stroke color as a CSS color string.
    pub stroke_color: String,
    /// Stroke width in canvas pixels, always within `[MIN_STROKE_WIDTH, MAX_STROKE_WIDTH]`.
    stroke_width: f64,
    /// Fill color for rect and circle elements.
    pub fill_color: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            stroke_color: DEFAULT_STROKE_COLOR.to_owned(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            fill_color: DEFAULT_FILL_COLOR.to_owned(),
        }
    }
}

impl ToolSettings {
    /// Default settings with `tool` selected.
    #[must_use]
    pub fn with_tool(tool: Tool) -> Self {
        Self { tool, ..Self::default() }
    }

    /// Current stroke width.
    #[must_use]
    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// Set the stroke width, clamped to the selectable range. Non-finite
    /// values leave the width unchanged.
    pub fn set_stroke_width(&mut self, width: f64) {
        if width.is_finite() {
            self.stroke_width = width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
        }
    }
}

/// Internal state for the gesture state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is drawing a new element.
    Drawing {
        /// Tool that was active at pointer-down.
        tool: Tool,
        /// Id of the element this gesture created and keeps growing.
        id: ElementId,
        /// Pointer-down position; shapes are sized relative to it.
        start: Point,
    },
}

impl GestureState {
    /// Id of the element being drawn, if a gesture is active.
    #[must_use]
    pub fn active_id(&self) -> Option<&ElementId> {
        match self {
            Self::Idle => None,
            Self::Drawing { id, .. } => Some(id),
        }
    }
}
