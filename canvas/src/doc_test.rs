#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn settings(tool: Tool) -> ToolSettings {
    ToolSettings::with_tool(tool)
}

fn owner() -> User {
    User { id: "u-1".into(), username: "Guest-1234".into(), color: "#FF6B6B".into() }
}

fn line(id: &str, points: &[f64]) -> Element {
    Element {
        id: ElementId::from(id),
        tool: Tool::Pen,
        owner_id: None,
        owner_name: None,
        owner_color: None,
        stroke_color: "#000000".into(),
        stroke_width: 5.0,
        shape: Shape::Line { points: points.to_vec() },
        extra: serde_json::Map::new(),
    }
}

fn opaque(id: &str) -> StoredElement {
    serde_json::from_value(json!({"id": id, "type": "triangle", "tool": "pen", "sides": 3}))
        .unwrap()
}

fn ids(store: &ElementStore) -> Vec<String> {
    store.elements().iter().map(|e| e.id().to_string()).collect()
}

// =============================================================
// ElementId
// =============================================================

#[test]
fn generated_ids_are_unique() {
    let a = ElementId::generate();
    let b = ElementId::generate();
    assert_ne!(a, b);
    assert_eq!(a.as_str().len(), 36);
}

#[test]
fn id_deserializes_from_string() {
    let id: ElementId = serde_json::from_value(json!("abc")).unwrap();
    assert_eq!(id.as_str(), "abc");
}

#[test]
fn id_deserializes_from_number() {
    let id: ElementId = serde_json::from_value(json!(1_700_000_000_123_u64)).unwrap();
    assert_eq!(id.as_str(), "1700000000123");
}

#[test]
fn id_serializes_as_string() {
    let value = serde_json::to_value(ElementId::from("x-1")).unwrap();
    assert_eq!(value, json!("x-1"));
}

// =============================================================
// Element: begin
// =============================================================

#[test]
fn begin_pen_is_one_point_line() {
    let el = Element::begin(ElementId::from("a"), &settings(Tool::Pen), None, pt(3.0, 4.0));
    assert_eq!(el.shape, Shape::Line { points: vec![3.0, 4.0] });
    assert_eq!(el.kind(), "line");
    assert_eq!(el.tool, Tool::Pen);
    assert_eq!(el.stroke_color, "#000000");
    assert_eq!(el.stroke_width, 5.0);
}

#[test]
fn begin_eraser_is_line_with_eraser_tool() {
    let el = Element::begin(ElementId::from("a"), &settings(Tool::Eraser), None, pt(1.0, 1.0));
    assert_eq!(el.kind(), "line");
    assert!(el.is_eraser());
}

#[test]
fn begin_rect_is_zero_sized_with_fill() {
    let mut s = settings(Tool::Rect);
    s.fill_color = "#00ff00".into();
    let el = Element::begin(ElementId::from("a"), &s, None, pt(10.0, 20.0));
    assert_eq!(
        el.shape,
        Shape::Rect { x: 10.0, y: 20.0, width: 0.0, height: 0.0, fill_color: "#00ff00".into() }
    );
    assert_eq!(el.fill_color(), Some("#00ff00"));
}

#[test]
fn begin_circle_is_zero_radius() {
    let el = Element::begin(ElementId::from("a"), &settings(Tool::Circle), None, pt(5.0, 6.0));
    assert_eq!(el.shape, Shape::Circle { x: 5.0, y: 6.0, radius: 0.0, fill_color: "transparent".into() });
}

#[test]
fn begin_without_owner_leaves_owner_fields_empty() {
    let el = Element::begin(ElementId::from("a"), &settings(Tool::Pen), None, pt(0.0, 0.0));
    assert_eq!(el.owner_id, None);
    assert_eq!(el.owner_name, None);
    assert_eq!(el.owner_color, None);
}

#[test]
fn begin_copies_owner_snapshot() {
    let user = owner();
    let el = Element::begin(ElementId::from("a"), &settings(Tool::Pen), Some(&user), pt(0.0, 0.0));
    assert_eq!(el.owner_id.as_deref(), Some("u-1"));
    assert_eq!(el.owner_name.as_deref(), Some("Guest-1234"));
    assert_eq!(el.owner_color.as_deref(), Some("#FF6B6B"));
}

#[test]
fn line_has_no_fill() {
    assert_eq!(line("a", &[0.0, 0.0]).fill_color(), None);
}

// =============================================================
// Element: reshape
// =============================================================

#[test]
fn reshape_line_appends_points() {
    let start = pt(0.0, 0.0);
    let mut el = Element::begin(ElementId::from("a"), &settings(Tool::Pen), None, start);
    el.reshape(start, pt(1.0, 1.0));
    el.reshape(start, pt(2.0, 2.0));
    assert_eq!(el.shape, Shape::Line { points: vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0] });
}

#[test]
fn reshape_rect_normalizes_corner() {
    let start = pt(50.0, 50.0);
    let mut el = Element::begin(ElementId::from("a"), &settings(Tool::Rect), None, start);
    el.reshape(start, pt(20.0, 80.0));
    let Shape::Rect { x, y, width, height, .. } = el.shape else {
        panic!("expected rect");
    };
    assert_eq!((x, y, width, height), (20.0, 50.0, 30.0, 30.0));
}

#[test]
fn reshape_rect_uses_start_not_previous_move() {
    let start = pt(0.0, 0.0);
    let mut el = Element::begin(ElementId::from("a"), &settings(Tool::Rect), None, start);
    el.reshape(start, pt(100.0, 100.0));
    el.reshape(start, pt(10.0, 5.0));
    let Shape::Rect { x, y, width, height, .. } = el.shape else {
        panic!("expected rect");
    };
    assert_eq!((x, y, width, height), (0.0, 0.0, 10.0, 5.0));
}

#[test]
fn reshape_circle_radius_is_distance() {
    let start = pt(0.0, 0.0);
    let mut el = Element::begin(ElementId::from("a"), &settings(Tool::Circle), None, start);
    el.reshape(start, pt(3.0, 4.0));
    let Shape::Circle { x, y, radius, .. } = el.shape else {
        panic!("expected circle");
    };
    assert_eq!((x, y, radius), (0.0, 0.0, 5.0));
}

// =============================================================
// Wire format
// =============================================================

#[test]
fn element_uses_wire_field_names() {
    let user = owner();
    let start = pt(1.0, 2.0);
    let mut el = Element::begin(ElementId::from("r-1"), &settings(Tool::Rect), Some(&user), start);
    el.reshape(start, pt(4.0, 6.0));
    let value = serde_json::to_value(&el).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "r-1",
            "type": "rect",
            "tool": "rect",
            "userId": "u-1",
            "username": "Guest-1234",
            "userColor": "#FF6B6B",
            "stroke": "#000000",
            "strokeWidth": 5.0,
            "x": 1.0,
            "y": 2.0,
            "width": 3.0,
            "height": 4.0,
            "fill": "transparent"
        })
    );
}

#[test]
fn element_without_owner_serializes_nulls() {
    let value = serde_json::to_value(line("a", &[0.0, 0.0])).unwrap();
    assert_eq!(value["userId"], json!(null));
    assert_eq!(value["username"], json!(null));
    assert_eq!(value["type"], json!("line"));
    assert_eq!(value["points"], json!([0.0, 0.0]));
}

#[test]
fn known_element_parses_from_peer_json() {
    let stored: StoredElement = serde_json::from_value(json!({
        "id": 1_700_000_000_000_u64,
        "type": "circle",
        "tool": "circle",
        "userId": "u-2",
        "username": "Ana",
        "userColor": "#4ECDC4",
        "stroke": "#ff0000",
        "strokeWidth": 3,
        "x": 10,
        "y": 10,
        "radius": 7.5,
        "fill": "#ffff00"
    }))
    .unwrap();
    let el = stored.as_known().unwrap();
    assert_eq!(el.id.as_str(), "1700000000000");
    assert_eq!(el.tool, Tool::Circle);
    assert_eq!(el.stroke_width, 3.0);
    assert_eq!(el.shape, Shape::Circle { x: 10.0, y: 10.0, radius: 7.5, fill_color: "#ffff00".into() });
}

#[test]
fn missing_fill_defaults_to_transparent() {
    let stored: StoredElement = serde_json::from_value(json!({
        "id": "r", "type": "rect", "tool": "rect", "stroke": "#000", "strokeWidth": 1,
        "x": 0, "y": 0, "width": 1, "height": 1
    }))
    .unwrap();
    assert_eq!(stored.as_known().unwrap().fill_color(), Some("transparent"));
}

#[test]
fn unknown_type_is_kept_opaque() {
    let stored = opaque("t-1");
    assert!(matches!(stored, StoredElement::Opaque(_)));
    assert_eq!(stored.id().as_str(), "t-1");
    assert!(stored.as_known().is_none());
}

#[test]
fn unknown_tool_is_kept_opaque() {
    let stored: StoredElement = serde_json::from_value(json!({
        "id": "l-1", "type": "line", "tool": "laser", "stroke": "#000", "strokeWidth": 1, "points": []
    }))
    .unwrap();
    assert!(matches!(stored, StoredElement::Opaque(_)));
}

#[test]
fn opaque_round_trips_unchanged() {
    let original = json!({"id": "t-1", "type": "triangle", "tool": "pen", "sides": 3});
    let stored: StoredElement = serde_json::from_value(original.clone()).unwrap();
    assert_eq!(serde_json::to_value(&stored).unwrap(), original);
}

#[test]
fn known_element_keeps_unmodeled_fields() {
    let original = json!({
        "id": "l-1", "type": "line", "tool": "pen", "userId": null, "username": null, "userColor": null,
        "stroke": "#000000", "strokeWidth": 5.0, "points": [0.0, 0.0, 1.0, 1.0],
        "opacity": 0.5, "dash": [4, 2]
    });
    let stored: StoredElement = serde_json::from_value(original.clone()).unwrap();
    let el = stored.as_known().unwrap();
    assert_eq!(el.extra.get("opacity"), Some(&json!(0.5)));
    assert!(!el.extra.contains_key("type"));
    assert!(!el.extra.contains_key("points"));
    assert_eq!(serde_json::to_value(&stored).unwrap(), original);
}

#[test]
fn reshape_keeps_unmodeled_fields() {
    let mut stored: StoredElement = serde_json::from_value(json!({
        "id": "r", "type": "rect", "tool": "rect", "stroke": "#000", "strokeWidth": 1,
        "x": 0, "y": 0, "width": 0, "height": 0, "opacity": 0.25
    }))
    .unwrap();
    let StoredElement::Known(el) = &mut stored else {
        panic!("expected a known element");
    };
    el.reshape(pt(0.0, 0.0), pt(2.0, 3.0));
    let value = serde_json::to_value(&stored).unwrap();
    assert_eq!(value["opacity"], json!(0.25));
    assert_eq!(value["width"], json!(2.0));
}

#[test]
fn element_without_id_is_rejected() {
    let result: Result<StoredElement, _> =
        serde_json::from_value(json!({"type": "line", "tool": "pen", "points": [0, 0]}));
    assert!(result.is_err());
}

// =============================================================
// ElementStore: upsert
// =============================================================

#[test]
fn store_new_is_empty() {
    let store = ElementStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
}

#[test]
fn upsert_new_id_appends() {
    let mut store = ElementStore::new();
    assert_eq!(store.upsert(line("a", &[0.0, 0.0])), Upserted::Inserted);
    assert_eq!(store.upsert(line("b", &[0.0, 0.0])), Upserted::Inserted);
    assert_eq!(ids(&store), ["a", "b"]);
}

#[test]
fn upsert_existing_id_replaces_in_place() {
    let mut store = ElementStore::new();
    store.upsert(line("a", &[0.0, 0.0]));
    store.upsert(line("b", &[0.0, 0.0]));
    store.upsert(line("c", &[0.0, 0.0]));

    assert_eq!(store.upsert(line("b", &[9.0, 9.0])), Upserted::Replaced);
    assert_eq!(ids(&store), ["a", "b", "c"]);
    let b = store.get_known(&ElementId::from("b")).unwrap();
    assert_eq!(b.shape, Shape::Line { points: vec![9.0, 9.0] });
}

#[test]
fn upsert_is_idempotent() {
    let mut once = ElementStore::new();
    once.upsert(line("a", &[1.0, 2.0]));

    let mut twice = ElementStore::new();
    twice.upsert(line("a", &[1.0, 2.0]));
    twice.upsert(line("a", &[1.0, 2.0]));

    assert_eq!(once.elements(), twice.elements());
}

#[test]
fn upsert_never_duplicates_ids() {
    let mut store = ElementStore::new();
    for round in 0..3 {
        for id in ["a", "b", "c"] {
            store.upsert(line(id, &[f64::from(round), 0.0]));
        }
    }
    assert_eq!(store.len(), 3);
}

#[test]
fn upsert_opaque_and_known_share_id_space() {
    let mut store = ElementStore::new();
    store.upsert(opaque("x"));
    assert_eq!(store.upsert(line("x", &[0.0, 0.0])), Upserted::Replaced);
    assert_eq!(store.len(), 1);
    assert!(store.get_known(&ElementId::from("x")).is_some());
}

// =============================================================
// ElementStore: replace_all / clear
// =============================================================

#[test]
fn replace_all_adopts_history_order() {
    let mut store = ElementStore::new();
    store.upsert(line("old", &[0.0, 0.0]));
    store.replace_all(vec![line("b", &[0.0, 0.0]).into(), line("a", &[0.0, 0.0]).into()]);
    assert_eq!(ids(&store), ["b", "a"]);
    assert!(!store.contains(&ElementId::from("old")));
}

#[test]
fn replace_all_empty_clears() {
    let mut store = ElementStore::new();
    store.upsert(line("a", &[0.0, 0.0]));
    store.replace_all(Vec::new());
    assert!(store.is_empty());
}

#[test]
fn replace_all_folds_duplicate_ids() {
    let mut store = ElementStore::new();
    store.replace_all(vec![
        line("a", &[1.0, 1.0]).into(),
        line("b", &[0.0, 0.0]).into(),
        line("a", &[2.0, 2.0]).into(),
    ]);
    assert_eq!(ids(&store), ["a", "b"]);
    let a = store.get_known(&ElementId::from("a")).unwrap();
    assert_eq!(a.shape, Shape::Line { points: vec![2.0, 2.0] });
}

#[test]
fn clear_then_upsert_starts_fresh() {
    let mut store = ElementStore::new();
    store.upsert(line("a", &[0.0, 0.0]));
    store.upsert(line("b", &[0.0, 0.0]));
    store.clear();
    assert!(store.is_empty());
    assert!(store.get(&ElementId::from("a")).is_none());

    store.upsert(line("b", &[0.0, 0.0]));
    assert_eq!(ids(&store), ["b"]);
}

#[test]
fn get_known_skips_opaque() {
    let mut store = ElementStore::new();
    store.upsert(opaque("t"));
    assert!(store.get(&ElementId::from("t")).is_some());
    assert!(store.get_known(&ElementId::from("t")).is_none());
}
