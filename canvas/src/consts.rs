//! Shared numeric constants and defaults for the canvas crate.
//!
//! All text-box and scroll values are percentages of the canvas dimensions.
//! Surface sizes are CSS pixels.

// ── Text boxes ──────────────────────────────────────────────────

/// Text given to a freshly added text box.
pub const DEFAULT_TEXT: &str = "New Text";

/// Default horizontal position of a new text box.
pub const DEFAULT_TEXT_X: f64 = 50.0;

/// Default vertical position of a new text box.
pub const DEFAULT_TEXT_Y: f64 = 50.0;

/// Default width of a new text box.
pub const DEFAULT_TEXT_WIDTH: f64 = 30.0;

pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_FONT_SIZE: f64 = 24.0;
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Smallest width accepted from any property edit.
pub const MIN_TEXT_WIDTH: f64 = 5.0;

/// Smallest width reachable by dragging the resize handle.
pub const MIN_RESIZE_WIDTH: f64 = 10.0;

/// Upper bound for every percentage field.
pub const MAX_PERCENT: f64 = 100.0;

// ── Scroll overlay ──────────────────────────────────────────────

/// Horizontal scroll offset range (percent of canvas width).
pub const SCROLL_OFFSET_X_MIN: f64 = -30.0;
pub const SCROLL_OFFSET_X_MAX: f64 = 30.0;

/// Vertical scroll offset range, measured up from the bottom edge.
pub const SCROLL_OFFSET_Y_MIN: f64 = 0.0;
pub const SCROLL_OFFSET_Y_MAX: f64 = 50.0;

/// Scroll width range (percent of canvas width).
pub const SCROLL_WIDTH_MIN: f64 = 50.0;
pub const SCROLL_WIDTH_MAX: f64 = 100.0;

/// The renderer's reduced scroll state never drops below this height.
pub const SCROLL_MID_FLOOR: u32 = 30;

/// Distance between the authored (max) height and the derived mid height.
pub const SCROLL_MID_STEP: u32 = 30;

// ── Image sequences ─────────────────────────────────────────────

/// Seconds each image stays on screen when no duration was authored.
pub const DEFAULT_IMAGE_SEQUENCE_DURATION: f64 = 5.0;

// ── Editing surface ─────────────────────────────────────────────

/// Canvas pixel size range, applied to both axes.
pub const CANVAS_SIZE_MIN: f64 = 400.0;
pub const CANVAS_SIZE_MAX: f64 = 2000.0;

pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 600.0;

/// Side panel pixel width range.
pub const PANEL_WIDTH_MIN: f64 = 200.0;
pub const PANEL_WIDTH_MAX: f64 = 600.0;

pub const DEFAULT_PANEL_WIDTH: f64 = 300.0;

/// Scheme prefix given to local preview handles.
pub const PREVIEW_SCHEME: &str = "blob:";
