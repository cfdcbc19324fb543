use crate::geometry::{
    CanvasRect, Point, SurfaceLayout, drag_position, grab_offset, resize_canvas, resize_panel, resize_width,
    scroll_drag,
};
use crate::input::{DragState, DragTarget, PanelSide};
use crate::model::CanvasModel;
use crate::page::{PartialTextBox, TextBoxId};

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

/// Changes produced by a pointer event, for the host to re-render.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    TextBoxMoved { id: TextBoxId, x: f64, y: f64 },
    TextBoxResized { id: TextBoxId, width: f64 },
    ScrollMoved { offset_x: f64, offset_y: f64 },
    SurfaceResized(SurfaceLayout),
    GestureEnded,
}

/// Canvas Model plus gesture routing.
///
/// The rendering layer reports pointer-down targets, pointer coordinates and
/// the canvas rect; everything else is computed here.
#[derive(Debug)]
pub struct EditorCore {
    pub model: CanvasModel,
    pub drag: DragState,
    pub surface: SurfaceLayout,
}

impl EditorCore {
    #[must_use]
    pub fn new(model: CanvasModel) -> Self {
        Self { model, drag: DragState::Idle, surface: SurfaceLayout::default() }
    }

    /// Start a gesture on `target`. Returns false if the target no longer exists.
    pub fn on_pointer_down(&mut self, target: DragTarget, pointer: Point, rect: CanvasRect) -> bool {
        self.drag = match target {
            DragTarget::TextBox(id) => {
                let Some(text_box) = self.model.text_box(&id) else {
                    return false;
                };
                let grab = grab_offset(pointer, text_box.layout.x, text_box.layout.y, rect);
                self.model.select(Some(&id));
                DragState::MovingText { id, grab }
            }
            DragTarget::TextBoxResizeHandle(id) => {
                if self.model.text_box(&id).is_none() {
                    return false;
                }
                self.model.select(Some(&id));
                DragState::ResizingText { id }
            }
            DragTarget::Scroll => {
                if self.model.scroll().is_empty() {
                    return false;
                }
                DragState::MovingScroll { last: pointer }
            }
            DragTarget::CanvasCorner => DragState::ResizingCanvas {
                start: pointer,
                orig_width: self.surface.canvas_width,
                orig_height: self.surface.canvas_height,
            },
            DragTarget::PanelEdge(side) => DragState::ResizingPanel {
                side,
                start_x: pointer.x,
                orig_width: match side {
                    PanelSide::Left => self.surface.left_panel_width,
                    PanelSide::Right => self.surface.right_panel_width,
                },
            },
        };
        true
    }

    /// Advance the active gesture to `pointer`.
    pub fn on_pointer_move(&mut self, pointer: Point, rect: CanvasRect) -> Action {
        match &mut self.drag {
            DragState::Idle => Action::None,
            DragState::MovingText { id, grab } => {
                let (x, y) = drag_position(pointer, *grab, rect);
                let id = id.clone();
                self.model.update_text_box(&id, &PartialTextBox::position(x, y));
                Action::TextBoxMoved { id, x, y }
            }
            DragState::ResizingText { id } => {
                let id = id.clone();
                let Some(box_x) = self.model.text_box(&id).map(|b| b.layout.x) else {
                    self.drag = DragState::Idle;
                    return Action::None;
                };
                let width = resize_width(pointer.x, box_x, rect);
                self.model.update_text_box(&id, &PartialTextBox::width(width));
                let width = self.model.text_box(&id).map_or(width, |b| b.layout.width);
                Action::TextBoxResized { id, width }
            }
            DragState::MovingScroll { last } => {
                let layout = &mut self.model.scroll_layout;
                let (offset_x, offset_y) = scroll_drag(*last, pointer, layout.offset_x, layout.offset_y, rect);
                layout.set_offsets(offset_x, offset_y);
                *last = pointer;
                Action::ScrollMoved { offset_x, offset_y }
            }
            DragState::ResizingCanvas { start, orig_width, orig_height } => {
                let (width, height) = resize_canvas(*start, pointer, *orig_width, *orig_height);
                self.surface.canvas_width = width;
                self.surface.canvas_height = height;
                Action::SurfaceResized(self.surface)
            }
            DragState::ResizingPanel { side, start_x, orig_width } => {
                let delta = pointer.x - *start_x;
                match side {
                    PanelSide::Left => self.surface.left_panel_width = resize_panel(*orig_width, delta),
                    PanelSide::Right => self.surface.right_panel_width = resize_panel(*orig_width, -delta),
                }
                Action::SurfaceResized(self.surface)
            }
        }
    }

    /// End the active gesture.
    pub fn on_pointer_up(&mut self) -> Action {
        if self.drag.is_idle() {
            return Action::None;
        }
        self.drag = DragState::Idle;
        Action::GestureEnded
    }
}
