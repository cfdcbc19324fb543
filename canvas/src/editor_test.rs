#![allow(clippy::float_cmp)]

use std::sync::Arc;

use super::*;
use crate::test_helpers::{RecordingPreviews, model_with};

fn rect() -> CanvasRect {
    CanvasRect::new(0.0, 0.0, 800.0, 600.0)
}

fn editor() -> EditorCore {
    let previews = Arc::new(RecordingPreviews::default());
    EditorCore::new(model_with(&previews))
}

// =============================================================
// Text boxes
// =============================================================

#[test]
fn pointer_down_on_box_selects_and_starts_move() {
    let mut core = editor();
    let id = core.model.add_text_box();
    core.model.select(None);

    assert!(core.on_pointer_down(DragTarget::TextBox(id.clone()), Point::new(400.0, 300.0), rect()));
    assert_eq!(core.model.selected(), Some(id.as_str()));
    assert!(matches!(core.drag, DragState::MovingText { .. }));
}

#[test]
fn moving_box_updates_model() {
    let mut core = editor();
    let id = core.model.add_text_box();
    core.on_pointer_down(DragTarget::TextBox(id.clone()), Point::new(400.0, 300.0), rect());

    let action = core.on_pointer_move(Point::new(480.0, 360.0), rect());
    assert_eq!(action, Action::TextBoxMoved { id: id.clone(), x: 60.0, y: 60.0 });
    let layout = &core.model.text_box(&id).unwrap().layout;
    assert_eq!((layout.x, layout.y), (60.0, 60.0));
}

#[test]
fn pointer_down_on_missing_box_is_rejected() {
    let mut core = editor();
    assert!(!core.on_pointer_down(DragTarget::TextBox("gone".into()), Point::new(0.0, 0.0), rect()));
    assert!(core.drag.is_idle());
}

#[test]
fn resizing_box_clamps_to_right_edge() {
    let mut core = editor();
    let id = core.model.add_text_box();
    core.on_pointer_down(DragTarget::TextBoxResizeHandle(id.clone()), Point::new(640.0, 300.0), rect());

    let action = core.on_pointer_move(Point::new(2000.0, 300.0), rect());
    assert_eq!(action, Action::TextBoxResized { id: id.clone(), width: 50.0 });
    assert_eq!(core.model.text_box(&id).unwrap().layout.width, 50.0);
}

#[test]
fn resizing_box_past_ninety_five_keeps_minimum_width() {
    let mut core = editor();
    let id = core.model.add_text_box();
    core.model.update_text_box(&id, &PartialTextBox::position(97.0, 50.0));
    let wide = CanvasRect::new(0.0, 0.0, 1000.0, 600.0);
    core.on_pointer_down(DragTarget::TextBoxResizeHandle(id.clone()), Point::new(980.0, 300.0), wide);

    // The minimum width wins over the right edge, so the box overhangs by 2%.
    let action = core.on_pointer_move(Point::new(990.0, 300.0), wide);
    assert_eq!(action, Action::TextBoxResized { id: id.clone(), width: 5.0 });
    let layout = &core.model.text_box(&id).unwrap().layout;
    assert_eq!(layout.x + layout.width, 102.0);
}

#[test]
fn resizing_deleted_box_ends_gesture() {
    let mut core = editor();
    let id = core.model.add_text_box();
    core.on_pointer_down(DragTarget::TextBoxResizeHandle(id.clone()), Point::new(640.0, 300.0), rect());
    core.model.delete_text_box(&id);
    assert_eq!(core.on_pointer_move(Point::new(700.0, 300.0), rect()), Action::None);
    assert!(core.drag.is_idle());
}

// =============================================================
// Scroll
// =============================================================

#[test]
fn scroll_drag_requires_a_scroll() {
    let mut core = editor();
    assert!(!core.on_pointer_down(DragTarget::Scroll, Point::new(0.0, 0.0), rect()));
}

#[test]
fn scroll_drag_accumulates_per_event_deltas() {
    let mut core = editor();
    core.model.set_scroll_reference(Some("https://x/scroll.png"));
    core.on_pointer_down(DragTarget::Scroll, Point::new(400.0, 300.0), rect());

    core.on_pointer_move(Point::new(440.0, 300.0), rect());
    let action = core.on_pointer_move(Point::new(480.0, 240.0), rect());
    assert_eq!(action, Action::ScrollMoved { offset_x: 10.0, offset_y: 10.0 });
    assert_eq!(core.model.scroll_layout.offset_x, 10.0);
    assert_eq!(core.model.scroll_layout.offset_y, 10.0);
}

// =============================================================
// Surface
// =============================================================

#[test]
fn canvas_corner_resizes_surface() {
    let mut core = editor();
    core.on_pointer_down(DragTarget::CanvasCorner, Point::new(800.0, 600.0), rect());
    let action = core.on_pointer_move(Point::new(900.0, 500.0), rect());
    let Action::SurfaceResized(surface) = action else {
        panic!("expected surface resize, got {action:?}");
    };
    assert_eq!((surface.canvas_width, surface.canvas_height), (900.0, 500.0));
}

#[test]
fn right_panel_grows_when_dragged_left() {
    let mut core = editor();
    core.on_pointer_down(DragTarget::PanelEdge(PanelSide::Right), Point::new(1000.0, 0.0), rect());
    core.on_pointer_move(Point::new(950.0, 0.0), rect());
    assert_eq!(core.surface.right_panel_width, 350.0);
    assert_eq!(core.surface.left_panel_width, 300.0);
}

#[test]
fn left_panel_grows_when_dragged_right() {
    let mut core = editor();
    core.on_pointer_down(DragTarget::PanelEdge(PanelSide::Left), Point::new(300.0, 0.0), rect());
    core.on_pointer_move(Point::new(1000.0, 0.0), rect());
    assert_eq!(core.surface.left_panel_width, 600.0);
}

// =============================================================
// Gesture end
// =============================================================

#[test]
fn pointer_up_ends_gesture() {
    let mut core = editor();
    core.on_pointer_down(DragTarget::CanvasCorner, Point::new(0.0, 0.0), rect());
    assert_eq!(core.on_pointer_up(), Action::GestureEnded);
    assert!(core.drag.is_idle());
    assert_eq!(core.on_pointer_up(), Action::None);
}

#[test]
fn move_without_gesture_is_noop() {
    let mut core = editor();
    assert_eq!(core.on_pointer_move(Point::new(10.0, 10.0), rect()), Action::None);
}
