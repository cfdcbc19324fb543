//! Persisted page records and field-variant resolution.
//!
//! Pages written by older schema revisions store the same value in different
//! places. [`PersistedPage`] accepts every known location, and each
//! `resolve_*` method below is the one place the precedence for a field is
//! decided. Nothing else reads the raw variant fields.
//!
//! | Field | Precedence (first non-empty wins) |
//! |-------|-----------------------------------|
//! | background URL | `backgroundUrl`, `content.backgroundUrl`, `background.url`, `imageUrl` |
//! | scroll URL | `scrollUrl`, `content.scrollUrl`, `scroll.url` |
//! | sound-effect URL | `soundEffectUrl`, `content.soundEffectUrl`, `soundEffect.url` |
//! | text boxes | `textBoxes`, `content.textBoxes` |
//! | scroll height | `scrollHeight`, `scrollMaxHeight`, 60 |

#[cfg(test)]
#[path = "persisted_test.rs"]
mod persisted_test;

use serde::{Deserialize, Serialize};

use crate::page::{
    BackgroundKind, ImageAnimation, ScrollHeight, TextBoxLayout, WebViewSource, null_as_default,
};

/// A media reference nested under its own key (`background: { url, type }`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NestedMedia {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<BackgroundKind>,
    pub filename: Option<String>,
}

/// The `content` sub-document used by one schema revision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageContent {
    pub background_url: Option<String>,
    pub scroll_url: Option<String>,
    pub sound_effect_url: Option<String>,
    pub text_boxes: Option<Vec<TextBoxLayout>>,
}

/// A persisted sequence item. `audio_url` only appears on video items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSequenceItem {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(deserialize_with = "null_as_default")]
    pub order: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// A page as returned by the page-storage API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedPage {
    #[serde(alias = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub book_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub page_number: u32,

    pub background_url: Option<String>,
    pub image_url: Option<String>,
    pub background: Option<NestedMedia>,
    pub background_type: Option<BackgroundKind>,
    pub background_audio_url: Option<String>,

    pub scroll_url: Option<String>,
    pub scroll: Option<NestedMedia>,
    pub scroll_height: Option<f64>,
    pub scroll_mid_height: Option<f64>,
    pub scroll_max_height: Option<f64>,
    pub scroll_offset_y: Option<f64>,
    pub scroll_offset_x: Option<f64>,
    pub scroll_width: Option<f64>,

    pub sound_effect_url: Option<String>,
    pub sound_effect: Option<NestedMedia>,
    pub sound_effect_filename: Option<String>,

    pub text_boxes: Option<Vec<TextBoxLayout>>,
    pub content: Option<PageContent>,

    #[serde(deserialize_with = "null_as_default")]
    pub is_coloring_page: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub coloring_end_modal_only: bool,

    #[serde(deserialize_with = "null_as_default")]
    pub is_web_view_page: bool,
    pub web_view_source: Option<WebViewSource>,
    pub web_view_url: Option<String>,
    pub web_view_game_id: Option<String>,
    pub web_view_title: Option<String>,
    pub show_navigation_button: Option<bool>,

    #[serde(deserialize_with = "null_as_default")]
    pub use_video_sequence: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub video_sequence: Vec<PersistedSequenceItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub use_image_sequence: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub image_sequence: Vec<PersistedSequenceItem>,
    pub image_sequence_duration: Option<f64>,
    pub image_sequence_animation: Option<ImageAnimation>,
}

fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a String>>) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|s| !s.is_empty())
}

impl PersistedPage {
    fn content_field<'a>(&'a self, pick: impl Fn(&'a PageContent) -> Option<&'a String>) -> Option<&'a String> {
        self.content.as_ref().and_then(pick)
    }

    fn nested_url(media: Option<&NestedMedia>) -> Option<&String> {
        media.and_then(|m| m.url.as_ref())
    }

    #[must_use]
    pub fn resolve_background_url(&self) -> Option<&str> {
        first_non_empty([
            self.background_url.as_ref(),
            self.content_field(|c| c.background_url.as_ref()),
            Self::nested_url(self.background.as_ref()),
            self.image_url.as_ref(),
        ])
    }

    /// Explicit type first, then the nested type, then the URL's extension.
    #[must_use]
    pub fn resolve_background_kind(&self) -> BackgroundKind {
        self.background_type
            .or_else(|| self.background.as_ref().and_then(|b| b.kind))
            .unwrap_or_else(|| {
                self.resolve_background_url()
                    .map(BackgroundKind::infer)
                    .unwrap_or_default()
            })
    }

    #[must_use]
    pub fn resolve_scroll_url(&self) -> Option<&str> {
        first_non_empty([
            self.scroll_url.as_ref(),
            self.content_field(|c| c.scroll_url.as_ref()),
            Self::nested_url(self.scroll.as_ref()),
        ])
    }

    #[must_use]
    pub fn resolve_scroll_height(&self) -> ScrollHeight {
        self.scroll_height
            .or(self.scroll_max_height)
            .map_or(ScrollHeight::Max, ScrollHeight::from_percent)
    }

    #[must_use]
    pub fn resolve_sound_effect_url(&self) -> Option<&str> {
        first_non_empty([
            self.sound_effect_url.as_ref(),
            self.content_field(|c| c.sound_effect_url.as_ref()),
            Self::nested_url(self.sound_effect.as_ref()),
        ])
    }

    #[must_use]
    pub fn resolve_sound_effect_filename(&self) -> Option<&str> {
        first_non_empty([
            self.sound_effect_filename.as_ref(),
            self.sound_effect.as_ref().and_then(|s| s.filename.as_ref()),
        ])
    }

    /// Root-level boxes win over `content.textBoxes`, even when empty.
    #[must_use]
    pub fn resolve_text_boxes(&self) -> &[TextBoxLayout] {
        self.text_boxes
            .as_deref()
            .or_else(|| self.content.as_ref().and_then(|c| c.text_boxes.as_deref()))
            .unwrap_or_default()
    }
}
