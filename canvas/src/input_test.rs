#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_pen() {
    assert_eq!(Tool::default(), Tool::Pen);
}

#[test]
fn tool_serde_lowercase() {
    for tool in [Tool::Pen, Tool::Eraser, Tool::Rect, Tool::Circle] {
        let json = serde_json::to_string(&tool).unwrap();
        assert_eq!(json, format!("\"{}\"", tool.as_str()));
        let back: Tool = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tool);
    }
}

#[test]
fn tool_unknown_name_is_rejected() {
    assert!(serde_json::from_str::<Tool>("\"laser\"").is_err());
}

// =============================================================
// Point
// =============================================================

#[test]
fn point_distance() {
    assert_eq!(Point::new(0.0, 0.0).distance_to(Point::new(3.0, 4.0)), 5.0);
    assert_eq!(Point::new(1.0, 1.0).distance_to(Point::new(1.0, 1.0)), 0.0);
}

#[test]
fn point_distance_is_symmetric() {
    let a = Point::new(-2.0, 7.5);
    let b = Point::new(4.0, -1.0);
    assert_eq!(a.distance_to(b), b.distance_to(a));
}

// =============================================================
// ToolSettings
// =============================================================

#[test]
fn settings_defaults() {
    let s = ToolSettings::default();
    assert_eq!(s.tool, Tool::Pen);
    assert_eq!(s.stroke_color, "#000000");
    assert_eq!(s.stroke_width(), 5.0);
    assert_eq!(s.fill_color, "transparent");
}

#[test]
fn with_tool_keeps_other_defaults() {
    let s = ToolSettings::with_tool(Tool::Circle);
    assert_eq!(s.tool, Tool::Circle);
    assert_eq!(s.stroke_width(), ToolSettings::default().stroke_width());
    assert_eq!(s.fill_color, ToolSettings::default().fill_color);
}

#[test]
fn stroke_width_in_range_is_kept() {
    let mut s = ToolSettings::default();
    s.set_stroke_width(12.0);
    assert_eq!(s.stroke_width(), 12.0);
}

#[test]
fn stroke_width_is_clamped() {
    let mut s = ToolSettings::default();
    s.set_stroke_width(0.0);
    assert_eq!(s.stroke_width(), MIN_STROKE_WIDTH);
    s.set_stroke_width(100.0);
    assert_eq!(s.stroke_width(), MAX_STROKE_WIDTH);
}

#[test]
fn stroke_width_ignores_nan() {
    let mut s = ToolSettings::default();
    s.set_stroke_width(8.0);
    s.set_stroke_width(f64::NAN);
    assert_eq!(s.stroke_width(), 8.0);
    s.set_stroke_width(f64::INFINITY);
    assert_eq!(s.stroke_width(), 8.0);
}

// =============================================================
// GestureState
// =============================================================

#[test]
fn gesture_default_is_idle() {
    let state = GestureState::default();
    assert_eq!(state, GestureState::Idle);
    assert!(state.active_id().is_none());
}

#[test]
fn gesture_drawing_exposes_active_id() {
    let id = ElementId::from("el-1");
    let state = GestureState::Drawing { tool: Tool::Rect, id: id.clone(), start: Point::new(1.0, 2.0) };
    assert_eq!(state.active_id(), Some(&id));
}
