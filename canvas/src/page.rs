//! Page value types: text boxes, scroll overlay, background, web view.
//!
//! These types describe what is on a page independent of how the media behind
//! it is held. Media handles (remote URLs, local previews, staged files) live
//! in [`crate::media`]; the Canvas Model in [`crate::model`] ties the two
//! together.

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::{
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_TEXT, DEFAULT_TEXT_COLOR, DEFAULT_TEXT_WIDTH,
    DEFAULT_TEXT_X, DEFAULT_TEXT_Y, MAX_PERCENT, MIN_TEXT_WIDTH, SCROLL_OFFSET_X_MAX,
    SCROLL_OFFSET_X_MIN, SCROLL_OFFSET_Y_MAX, SCROLL_OFFSET_Y_MIN, SCROLL_WIDTH_MAX,
    SCROLL_WIDTH_MIN,
};

/// Client-side correlation handle for a text box. Never persisted.
pub type TextBoxId = String;

/// Horizontal text alignment inside a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// A text box as persisted: everything except the client-only `id`.
///
/// Positions and sizes are percentages of the canvas. A `height` of `None`
/// means the box sizes itself to its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBoxLayout {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default = "default_x", deserialize_with = "null_as_default_x")]
    pub x: f64,
    #[serde(default = "default_y", deserialize_with = "null_as_default_y")]
    pub y: f64,
    #[serde(default = "default_width", deserialize_with = "null_as_default_width")]
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alignment: TextAlign,
    #[serde(default = "default_font_family", deserialize_with = "null_as_default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size", deserialize_with = "null_as_default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_color", deserialize_with = "null_as_default_color")]
    pub color: String,
}

/// Reads an explicit `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

macro_rules! null_as {
    ($name:ident, $default:ident, $ty:ty) => {
        fn $name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<$ty, D::Error> {
            Ok(Option::<$ty>::deserialize(deserializer)?.unwrap_or_else($default))
        }
    };
}

null_as!(null_as_default_x, default_x, f64);
null_as!(null_as_default_y, default_y, f64);
null_as!(null_as_default_width, default_width, f64);
null_as!(null_as_default_font_family, default_font_family, String);
null_as!(null_as_default_font_size, default_font_size, f64);
null_as!(null_as_default_color, default_color, String);

fn default_x() -> f64 {
    DEFAULT_TEXT_X
}

fn default_y() -> f64 {
    DEFAULT_TEXT_Y
}

fn default_width() -> f64 {
    DEFAULT_TEXT_WIDTH
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_owned()
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

fn default_color() -> String {
    DEFAULT_TEXT_COLOR.to_owned()
}

impl Default for TextBoxLayout {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_owned(),
            x: DEFAULT_TEXT_X,
            y: DEFAULT_TEXT_Y,
            width: DEFAULT_TEXT_WIDTH,
            height: None,
            alignment: TextAlign::Center,
            font_family: default_font_family(),
            font_size: DEFAULT_FONT_SIZE,
            color: default_color(),
        }
    }
}

impl TextBoxLayout {
    /// Copy of this layout with the text blanked; position and style kept.
    #[must_use]
    pub fn without_text(&self) -> Self {
        Self { text: String::new(), ..self.clone() }
    }
}

/// A text box on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub id: TextBoxId,
    pub layout: TextBoxLayout,
}

impl TextBox {
    #[must_use]
    pub fn new(id: TextBoxId, layout: TextBoxLayout) -> Self {
        Self { id, layout }
    }

    /// Apply a sparse update, clamping every geometric field.
    ///
    /// `x` and `y` land in `[0, 100]`, `width` in `[5, 100]`, and `height` in
    /// `[0, 100]` where zero means auto-sized. The `x + width <= 100` bound is
    /// only applied by the resize gesture, not here.
    pub fn apply(&mut self, partial: &PartialTextBox) {
        let layout = &mut self.layout;
        if let Some(ref text) = partial.text {
            layout.text.clone_from(text);
        }
        if let Some(x) = partial.x {
            layout.x = clamp_percent(x);
        }
        if let Some(y) = partial.y {
            layout.y = clamp_percent(y);
        }
        if let Some(width) = partial.width {
            layout.width = clamp_finite(width, MIN_TEXT_WIDTH, MAX_PERCENT);
        }
        if let Some(height) = partial.height {
            layout.height = height
                .map(clamp_percent)
                .filter(|h| *h > 0.0);
        }
        if let Some(alignment) = partial.alignment {
            layout.alignment = alignment;
        }
        if let Some(ref family) = partial.font_family {
            layout.font_family.clone_from(family);
        }
        if let Some(size) = partial.font_size {
            layout.font_size = size.max(1.0);
        }
        if let Some(ref color) = partial.color {
            layout.color.clone_from(color);
        }
    }
}

/// Sparse update for a text box. Only present fields are applied.
///
/// `height` is doubly optional: `Some(None)` switches the box back to auto
/// height, `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialTextBox {
    pub text: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<Option<f64>>,
    pub alignment: Option<TextAlign>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub color: Option<String>,
}

impl PartialTextBox {
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    #[must_use]
    pub fn width(width: f64) -> Self {
        Self { width: Some(width), ..Default::default() }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Default::default() }
    }
}

/// Clamp a value to `[0, 100]`, mapping NaN to zero.
#[must_use]
pub fn clamp_percent(value: f64) -> f64 {
    clamp_finite(value, 0.0, MAX_PERCENT)
}

pub(crate) fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}

// =============================================================================
// SCROLL
// =============================================================================

/// The three canonical scroll heights, as a percentage of canvas height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollHeight {
    Hidden,
    Mid,
    #[default]
    Max,
}

impl ScrollHeight {
    /// Height as a percentage: 0, 30 or 60.
    #[must_use]
    pub fn percent(self) -> u32 {
        match self {
            Self::Hidden => 0,
            Self::Mid => 30,
            Self::Max => 60,
        }
    }

    /// Snap an arbitrary stored height to the nearest canonical state.
    #[must_use]
    pub fn from_percent(value: f64) -> Self {
        if value.is_nan() || value < 15.0 {
            Self::Hidden
        } else if value < 45.0 {
            Self::Mid
        } else {
            Self::Max
        }
    }
}

/// Placement of the scroll overlay. The image itself is a media slot on the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollLayout {
    pub height: ScrollHeight,
    /// Vertical offset up from the bottom edge, in `[0, 50]`.
    pub offset_y: f64,
    /// Horizontal offset from center, in `[-30, 30]`.
    pub offset_x: f64,
    /// Width in `[50, 100]`.
    pub width: f64,
}

impl Default for ScrollLayout {
    fn default() -> Self {
        Self { height: ScrollHeight::Max, offset_y: 0.0, offset_x: 0.0, width: SCROLL_WIDTH_MAX }
    }
}

impl ScrollLayout {
    /// Set both offsets, clamped to their ranges.
    pub fn set_offsets(&mut self, offset_x: f64, offset_y: f64) {
        self.offset_x = clamp_finite(offset_x, SCROLL_OFFSET_X_MIN, SCROLL_OFFSET_X_MAX);
        self.offset_y = clamp_finite(offset_y, SCROLL_OFFSET_Y_MIN, SCROLL_OFFSET_Y_MAX);
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = clamp_finite(width, SCROLL_WIDTH_MIN, SCROLL_WIDTH_MAX);
    }
}

// =============================================================================
// BACKGROUND / VISUAL SOURCE
// =============================================================================

/// Media kind of the static background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    #[default]
    Image,
    Video,
}

impl BackgroundKind {
    /// Guess the kind from a URL's file extension.
    #[must_use]
    pub fn infer(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
        if [".mp4", ".webm", ".mov", ".m4v"].iter().any(|ext| path.ends_with(ext)) {
            Self::Video
        } else {
            Self::Image
        }
    }
}

/// Which visual layer is active for the page. Exactly one is, always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualMode {
    #[default]
    Background,
    VideoSequence,
    ImageSequence,
}

/// Animation applied to image-sequence frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageAnimation {
    #[default]
    KenBurns,
    ZoomIn,
    ZoomOut,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    None,
}

// =============================================================================
// PAGE MODES
// =============================================================================

/// Coloring-page flags. `end_modal_only` is only meaningful while `enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColoringMode {
    enabled: bool,
    end_modal_only: bool,
}

impl ColoringMode {
    #[must_use]
    pub fn new(enabled: bool, end_modal_only: bool) -> Self {
        Self { enabled, end_modal_only: enabled && end_modal_only }
    }

    #[must_use]
    pub fn enabled(self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn end_modal_only(self) -> bool {
        self.end_modal_only
    }

    /// Turning coloring off also clears `end_modal_only`.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.end_modal_only = false;
        }
    }

    /// Ignored unless coloring is enabled.
    pub fn set_end_modal_only(&mut self, value: bool) {
        self.end_modal_only = self.enabled && value;
    }
}

/// Where a web-view page takes its content from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebViewSource {
    #[default]
    Url,
    Game,
}

/// Web-view page configuration. When `enabled`, the consuming renderer hides
/// every other visual layer; the editor keeps them as a fallback.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WebView {
    pub enabled: bool,
    pub source: WebViewSource,
    pub url: Option<String>,
    pub game_id: Option<String>,
    pub title: Option<String>,
    pub show_navigation_button: bool,
}

impl WebView {
    /// Point the web view at a game, adopting its title when none was authored.
    pub fn select_game(&mut self, game_id: &str, url: &str, title: &str) {
        self.source = WebViewSource::Game;
        self.game_id = Some(game_id.to_owned());
        self.url = Some(url.to_owned()).filter(|u| !u.is_empty());
        if self.title.as_deref().is_none_or(str::is_empty) && !title.is_empty() {
            self.title = Some(title.to_owned());
        }
    }

    /// Point the web view at an arbitrary URL.
    pub fn select_url(&mut self, url: &str) {
        self.source = WebViewSource::Url;
        self.game_id = None;
        self.url = Some(url.to_owned()).filter(|u| !u.is_empty());
    }
}

// =============================================================================
// TEMPLATE
// =============================================================================

/// A reusable scroll + text-box layout for the pages of one book.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTemplate {
    #[serde(default)]
    pub scroll_url: Option<String>,
    #[serde(default = "default_template_scroll_height")]
    pub scroll_height: u32,
    #[serde(default)]
    pub text_boxes: Vec<TextBoxLayout>,
}

fn default_template_scroll_height() -> u32 {
    ScrollHeight::Max.percent()
}

impl PageTemplate {
    /// Whether the template carries anything worth applying.
    #[must_use]
    pub fn has_layout(&self) -> bool {
        self.scroll_url.as_deref().is_some_and(|u| !u.is_empty()) || !self.text_boxes.is_empty()
    }

    /// The same layout with every text box's text blanked.
    #[must_use]
    pub fn without_text(&self) -> Self {
        Self {
            scroll_url: self.scroll_url.clone(),
            scroll_height: self.scroll_height,
            text_boxes: self.text_boxes.iter().map(TextBoxLayout::without_text).collect(),
        }
    }
}
