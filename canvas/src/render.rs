//! Rendering contract: the draw list handed to the view layer.
//!
//! This module does not touch any drawing surface. It turns a read-only
//! snapshot of the store into one [`DrawCommand`] per renderable element, in
//! draw order, resolving the only piece of render logic the core owns:
//! eraser strokes are painted in the background color and composited as a
//! cut-out. Elements of unknown kinds stay in the store but are skipped here.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::consts::ERASER_COLOR;
use crate::doc::{Element, StoredElement};

/// How an element is blended onto what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    /// Normal painting over existing content.
    SourceOver,
    /// Removes existing content where the element is drawn.
    DestinationOut,
}

impl Composite {
    /// Canvas 2D `globalCompositeOperation` name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::DestinationOut => "destination-out",
        }
    }
}

/// One element to draw, with its resolved stroke and compositing.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand<'a> {
    pub element: &'a Element,
    /// Stroke color to paint with.
    pub stroke: &'a str,
    pub composite: Composite,
}

impl<'a> DrawCommand<'a> {
    #[must_use]
    pub fn for_element(element: &'a Element) -> Self {
        if element.is_eraser() {
            Self { element, stroke: ERASER_COLOR, composite: Composite::DestinationOut }
        } else {
            Self { element, stroke: &element.stroke_color, composite: Composite::SourceOver }
        }
    }
}

/// Build the draw list for `elements`, in order, skipping unknown kinds.
#[must_use]
pub fn draw_list(elements: &[StoredElement]) -> Vec<DrawCommand<'_>> {
    elements
        .iter()
        .filter_map(StoredElement::as_known)
        .map(DrawCommand::for_element)
        .collect()
}
