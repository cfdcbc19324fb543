#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::consts::{
    CANVAS_SIZE_MAX, CANVAS_SIZE_MIN, MAX_PERCENT, MIN_RESIZE_WIDTH, PANEL_WIDTH_MAX, PANEL_WIDTH_MIN,
    SCROLL_OFFSET_X_MAX, SCROLL_OFFSET_X_MIN, SCROLL_OFFSET_Y_MAX, SCROLL_OFFSET_Y_MIN,
};
use crate::page::{clamp_finite, clamp_percent};

/// A pointer position in client (CSS pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The canvas element's bounding rect in client coordinates, as measured by
/// the rendering layer at the time of the event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Percentage of canvas width to pixels.
    #[must_use]
    pub fn x_to_px(&self, percent: f64) -> f64 {
        percent / MAX_PERCENT * self.width
    }

    /// Percentage of canvas height to pixels.
    #[must_use]
    pub fn y_to_px(&self, percent: f64) -> f64 {
        percent / MAX_PERCENT * self.height
    }

    /// Pixels to percentage of canvas width. Zero for a collapsed canvas.
    #[must_use]
    pub fn x_to_percent(&self, px: f64) -> f64 {
        if self.width > 0.0 { px / self.width * MAX_PERCENT } else { 0.0 }
    }

    /// Pixels to percentage of canvas height. Zero for a collapsed canvas.
    #[must_use]
    pub fn y_to_percent(&self, px: f64) -> f64 {
        if self.height > 0.0 { px / self.height * MAX_PERCENT } else { 0.0 }
    }
}

// =============================================================================
// TEXT BOXES
// =============================================================================

/// Anchor captured when a text-box drag starts: where inside the box the
/// pointer grabbed it, in pixels from the box's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabOffset {
    pub dx: f64,
    pub dy: f64,
}

/// Capture the grab offset for a box at `(box_x, box_y)` percent.
#[must_use]
pub fn grab_offset(pointer: Point, box_x: f64, box_y: f64, rect: CanvasRect) -> GrabOffset {
    GrabOffset {
        dx: pointer.x - rect.left - rect.x_to_px(box_x),
        dy: pointer.y - rect.top - rect.y_to_px(box_y),
    }
}

/// New `(x, y)` percent for a dragged box, each clamped to `[0, 100]`.
#[must_use]
pub fn drag_position(pointer: Point, grab: GrabOffset, rect: CanvasRect) -> (f64, f64) {
    let px = pointer.x - rect.left - grab.dx;
    let py = pointer.y - rect.top - grab.dy;
    (clamp_percent(rect.x_to_percent(px)), clamp_percent(rect.y_to_percent(py)))
}

/// New width percent for a box resized from its right edge.
///
/// The result stays within `[10, 100 - box_x]` so the box never extends past
/// the canvas's right edge. For boxes starting right of 90% the right edge
/// wins over the minimum.
#[must_use]
pub fn resize_width(pointer_x: f64, box_x: f64, rect: CanvasRect) -> f64 {
    let box_left_px = rect.left + rect.x_to_px(box_x);
    let width = rect.x_to_percent(pointer_x - box_left_px);
    let max = (MAX_PERCENT - clamp_percent(box_x)).max(0.0);
    let width = if width.is_nan() { MIN_RESIZE_WIDTH } else { width.max(MIN_RESIZE_WIDTH) };
    width.min(max)
}

// =============================================================================
// SCROLL OVERLAY
// =============================================================================

/// Apply one pointer move to the scroll offsets.
///
/// Deltas are measured from the previous event, not from the drag start, so
/// the caller resets its anchor to `pointer` after every call. Moving up
/// raises the scroll because the vertical offset is measured from the bottom.
#[must_use]
pub fn scroll_drag(
    last: Point,
    pointer: Point,
    offset_x: f64,
    offset_y: f64,
    rect: CanvasRect,
) -> (f64, f64) {
    let dx = rect.x_to_percent(pointer.x - last.x);
    let dy = rect.y_to_percent(pointer.y - last.y);
    (
        clamp_finite(offset_x + dx, SCROLL_OFFSET_X_MIN, SCROLL_OFFSET_X_MAX),
        clamp_finite(offset_y - dy, SCROLL_OFFSET_Y_MIN, SCROLL_OFFSET_Y_MAX),
    )
}

// =============================================================================
// EDITING SURFACE
// =============================================================================

/// Pixel sizes of the editing surface: canvas and the two side panels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceLayout {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub left_panel_width: f64,
    pub right_panel_width: f64,
}

impl Default for SurfaceLayout {
    fn default() -> Self {
        use crate::consts::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_PANEL_WIDTH};
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            left_panel_width: DEFAULT_PANEL_WIDTH,
            right_panel_width: DEFAULT_PANEL_WIDTH,
        }
    }
}

/// New canvas size after dragging its corner from `start` to `pointer`.
#[must_use]
pub fn resize_canvas(start: Point, pointer: Point, orig_width: f64, orig_height: f64) -> (f64, f64) {
    (
        clamp_finite(orig_width + (pointer.x - start.x), CANVAS_SIZE_MIN, CANVAS_SIZE_MAX),
        clamp_finite(orig_height + (pointer.y - start.y), CANVAS_SIZE_MIN, CANVAS_SIZE_MAX),
    )
}

/// New side-panel width after dragging its edge by `delta_x` pixels.
///
/// `delta_x` is already signed for the panel's side: the left panel grows
/// when dragged right, the right panel when dragged left.
#[must_use]
pub fn resize_panel(orig_width: f64, delta_x: f64) -> f64 {
    clamp_finite(orig_width + delta_x, PANEL_WIDTH_MIN, PANEL_WIDTH_MAX)
}
