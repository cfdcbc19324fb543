//! Gesture state machine types.
//!
//! `DragState` is the active gesture tracked between pointer-down and
//! pointer-up. Each active variant carries the anchor its geometry function
//! needs on every pointer move.

use crate::geometry::{GrabOffset, Point};
use crate::page::TextBoxId;

/// Which side panel is being resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSide {
    Left,
    Right,
}

/// What the pointer went down on, as reported by the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DragTarget {
    /// The body of a text box.
    TextBox(TextBoxId),
    /// The right-edge resize handle of a text box.
    TextBoxResizeHandle(TextBoxId),
    /// The scroll overlay image.
    Scroll,
    /// The canvas's bottom-right resize corner.
    CanvasCorner,
    /// The inner edge of a side panel.
    PanelEdge(PanelSide),
}

/// Active gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving a text box.
    MovingText {
        id: TextBoxId,
        /// Pointer offset from the box's top-left at drag start.
        grab: GrabOffset,
    },
    /// Resizing a text box from its right edge.
    ResizingText { id: TextBoxId },
    /// Moving the scroll overlay.
    MovingScroll {
        /// Pointer position at the previous event; reset on every move.
        last: Point,
    },
    /// Resizing the canvas from its corner.
    ResizingCanvas {
        start: Point,
        orig_width: f64,
        orig_height: f64,
    },
    /// Resizing a side panel.
    ResizingPanel {
        side: PanelSide,
        start_x: f64,
        orig_width: f64,
    },
}

impl DragState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
