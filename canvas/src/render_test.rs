use serde_json::json;

use super::*;
use crate::doc::ElementId;
use crate::input::{Point, Tool, ToolSettings};

fn element(id: &str, tool: Tool) -> StoredElement {
    let mut settings = ToolSettings::with_tool(tool);
    settings.stroke_color = "#ff0000".into();
    Element::begin(ElementId::from(id), &settings, None, Point::new(0.0, 0.0)).into()
}

#[test]
fn composite_names() {
    assert_eq!(Composite::SourceOver.as_str(), "source-over");
    assert_eq!(Composite::DestinationOut.as_str(), "destination-out");
}

#[test]
fn pen_draws_in_own_color() {
    let elements = [element("a", Tool::Pen)];
    let list = draw_list(&elements);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].stroke, "#ff0000");
    assert_eq!(list[0].composite, Composite::SourceOver);
}

#[test]
fn eraser_draws_background_cutout() {
    let elements = [element("e", Tool::Eraser)];
    let list = draw_list(&elements);
    assert_eq!(list[0].stroke, ERASER_COLOR);
    assert_eq!(list[0].composite, Composite::DestinationOut);
}

#[test]
fn draw_list_follows_store_order() {
    let elements = [element("c", Tool::Circle), element("a", Tool::Rect), element("b", Tool::Pen)];
    let list = draw_list(&elements);
    let ids: Vec<&str> = list.iter().map(|c| c.element.id.as_str()).collect();
    assert_eq!(ids, ["c", "a", "b"]);
}

#[test]
fn draw_list_skips_opaque() {
    let opaque: StoredElement = serde_json::from_value(json!({"id": "s", "type": "star"})).unwrap();
    let elements = [element("a", Tool::Pen), opaque, element("b", Tool::Pen)];
    let list = draw_list(&elements);
    let ids: Vec<&str> = list.iter().map(|c| c.element.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
}

#[test]
fn draw_list_empty() {
    assert!(draw_list(&[]).is_empty());
}
