//! Document model: drawable elements and the ordered in-memory store.
//!
//! This module defines the data types that describe what is on the canvas
//! (`Element`, `Shape`), the envelope the store actually holds
//! (`StoredElement`, which also keeps elements of kinds this build does not
//! understand), and the runtime store that owns them (`ElementStore`).
//!
//! Data flows into this layer from the network (JSON deserialization) and
//! from the gesture engine (local mutations). The renderer reads the store in
//! insertion order; there is no z-index, so position in the store is draw
//! order.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::consts::DEFAULT_FILL_COLOR;
use crate::input::{Point, Tool, ToolSettings};
use crate::presence::User;

/// Unique identifier for an element.
///
/// Locally generated ids are random UUIDs. Peers running older clients may
/// send numeric ids; those are kept as their decimal text so that upserts
/// from the same peer still land on the same element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Allocate a fresh, collision-resistant id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(text) => Self(text),
            WireId::Number(number) => Self(number.to_string()),
        })
    }
}

/// Geometry of an element, discriminated on the wire by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    /// Free-hand stroke.
    Line {
        /// Flattened `[x0, y0, x1, y1, …]` coordinate pairs, in drawing order.
        points: Vec<f64>,
    },
    /// Axis-aligned rectangle.
    Rect {
        /// Left edge; never greater than the right edge.
        x: f64,
        /// Top edge; never greater than the bottom edge.
        y: f64,
        /// Non-negative width.
        width: f64,
        /// Non-negative height.
        height: f64,
        #[serde(rename = "fill", default = "default_fill")]
        fill_color: String,
    },
    /// Circle around a fixed center.
    Circle {
        /// Center x, fixed at the gesture start.
        x: f64,
        /// Center y, fixed at the gesture start.
        y: f64,
        /// Non-negative radius.
        radius: f64,
        #[serde(rename = "fill", default = "default_fill")]
        fill_color: String,
    },
}

fn default_fill() -> String {
    DEFAULT_FILL_COLOR.to_owned()
}

/// A drawable element as held in the store and sent on the wire.
///
/// The owner fields are a snapshot of the creator's presence at creation
/// time; they are not updated if the owner later renames. They are `None`
/// when the element was drawn before the local identity arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier, assigned at creation and never reassigned.
    pub id: ElementId,
    /// Tool active when the element was created.
    pub tool: Tool,
    #[serde(rename = "userId", default)]
    pub owner_id: Option<String>,
    #[serde(rename = "username", default)]
    pub owner_name: Option<String>,
    #[serde(rename = "userColor", default)]
    pub owner_color: Option<String>,
    /// Stroke color as a CSS color string.
    #[serde(rename = "stroke")]
    pub stroke_color: String,
    /// Stroke width in canvas pixels.
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f64,
    /// Variant-specific geometry.
    #[serde(flatten)]
    pub shape: Shape,
    /// Fields this build does not model (e.g. from newer clients), kept so
    /// the element is re-sent exactly as received.
    #[serde(flatten, deserialize_with = "unmodeled_fields")]
    pub extra: Map<String, Value>,
}

/// Every wire key `Element` or `Shape` reads itself.
const MODELED_KEYS: &[&str] = &[
    "id", "type", "tool", "userId", "username", "userColor", "stroke", "strokeWidth", "points", "x", "y", "width",
    "height", "radius", "fill",
];

fn unmodeled_fields<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Map<String, Value>, D::Error> {
    let mut fields = Map::deserialize(deserializer)?;
    fields.retain(|key, _| !MODELED_KEYS.contains(&key.as_str()));
    Ok(fields)
}

impl Element {
    /// Build the seed element for a gesture that starts at `start`.
    ///
    /// Pen and eraser produce a one-point line; rect and circle produce a
    /// zero-sized shape anchored at `start`, filled with the current fill.
    #[must_use]
    pub fn begin(id: ElementId, settings: &ToolSettings, owner: Option<&User>, start: Point) -> Self {
        let shape = match settings.tool {
            Tool::Pen | Tool::Eraser => Shape::Line { points: vec![start.x, start.y] },
            Tool::Rect => Shape::Rect {
                x: start.x,
                y: start.y,
                width: 0.0,
                height: 0.0,
                fill_color: settings.fill_color.clone(),
            },
            Tool::Circle => Shape::Circle {
                x: start.x,
                y: start.y,
                radius: 0.0,
                fill_color: settings.fill_color.clone(),
            },
        };

        Self {
            id,
            tool: settings.tool,
            owner_id: owner.map(|u| u.id.clone()),
            owner_name: owner.map(|u| u.username.clone()),
            owner_color: owner.map(|u| u.color.clone()),
            stroke_color: settings.stroke_color.clone(),
            stroke_width: settings.stroke_width(),
            shape,
            extra: Map::new(),
        }
    }

    /// Grow the element for a pointer that moved from `start` to `current`.
    ///
    /// Lines append `current`; rects span the box between the two points
    /// with a normalized top-left corner; circles keep their center and take
    /// the distance as radius.
    pub fn reshape(&mut self, start: Point, current: Point) {
        match &mut self.shape {
            Shape::Line { points } => points.extend([current.x, current.y]),
            Shape::Rect { x, y, width, height, .. } => {
                *x = start.x.min(current.x);
                *y = start.y.min(current.y);
                *width = (current.x - start.x).abs();
                *height = (current.y - start.y).abs();
            }
            Shape::Circle { radius, .. } => *radius = start.distance_to(current),
        }
    }

    /// Wire name of the element's `type`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self.shape {
            Shape::Line { .. } => "line",
            Shape::Rect { .. } => "rect",
            Shape::Circle { .. } => "circle",
        }
    }

    /// Fill color, for shapes that have one.
    #[must_use]
    pub fn fill_color(&self) -> Option<&str> {
        match &self.shape {
            Shape::Line { .. } => None,
            Shape::Rect { fill_color, .. } | Shape::Circle { fill_color, .. } => Some(fill_color),
        }
    }

    /// Whether the renderer should composite this element as a cut-out.
    #[must_use]
    pub fn is_eraser(&self) -> bool {
        self.tool == Tool::Eraser
    }
}

/// An element whose `type` or `tool` this build does not recognize.
///
/// Kept verbatim so that it still occupies its slot, survives a history
/// replay, and round-trips unchanged. Never rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueElement {
    pub id: ElementId,
    /// Every other field, exactly as received.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One entry in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredElement {
    Known(Element),
    Opaque(OpaqueElement),
}

impl StoredElement {
    #[must_use]
    pub fn id(&self) -> &ElementId {
        match self {
            Self::Known(el) => &el.id,
            Self::Opaque(el) => &el.id,
        }
    }

    /// The element, if its kind is recognized.
    #[must_use]
    pub fn as_known(&self) -> Option<&Element> {
        match self {
            Self::Known(el) => Some(el),
            Self::Opaque(_) => None,
        }
    }
}

impl From<Element> for StoredElement {
    fn from(value: Element) -> Self {
        Self::Known(value)
    }
}

impl From<OpaqueElement> for StoredElement {
    fn from(value: OpaqueElement) -> Self {
        Self::Opaque(value)
    }
}

/// Outcome of [`ElementStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    /// The id was new; the element was appended.
    Inserted,
    /// The id existed; the element was replaced at its current position.
    Replaced,
}

/// Ordered in-memory store of elements, unique by id.
///
/// The only mutation entry points are [`upsert`](Self::upsert),
/// [`replace_all`](Self::replace_all) and [`clear`](Self::clear).
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    elements: Vec<StoredElement>,
    /// Position of each id in `elements`.
    index: HashMap<ElementId, usize>,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an element. An existing id is replaced in place and
    /// keeps its position; a new id is appended.
    pub fn upsert(&mut self, element: impl Into<StoredElement>) -> Upserted {
        let element = element.into();
        if let Some(&pos) = self.index.get(element.id()) {
            self.elements[pos] = element;
            Upserted::Replaced
        } else {
            self.index.insert(element.id().clone(), self.elements.len());
            self.elements.push(element);
            Upserted::Inserted
        }
    }

    /// Discard every element and adopt `history` in the given order.
    ///
    /// A history that repeats an id keeps the first position and the last
    /// value for it.
    pub fn replace_all(&mut self, history: Vec<StoredElement>) {
        self.clear();
        self.elements.reserve(history.len());
        for element in history {
            self.upsert(element);
        }
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.index.clear();
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&StoredElement> {
        self.index.get(id).map(|&pos| &self.elements[pos])
    }

    /// Look up a recognized element by id.
    #[must_use]
    pub fn get_known(&self, id: &ElementId) -> Option<&Element> {
        self.get(id).and_then(StoredElement::as_known)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.index.contains_key(id)
    }

    /// Every entry in draw order.
    #[must_use]
    pub fn elements(&self) -> &[StoredElement] {
        &self.elements
    }

    /// Number of entries currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the store contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
