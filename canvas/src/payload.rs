//! Save payload assembly.
//!
//! The payload is what `POST /api/pages` and `PUT /api/pages/{id}` receive.
//! It is built from the Canvas Model plus a [`ResolvedMedia`] holding the
//! persisted URLs each media slot ended up with. Building it is pure; the
//! uploads that produce `ResolvedMedia` happen in the async editor crate.

#[cfg(test)]
#[path = "payload_test.rs"]
mod payload_test;

use serde::{Deserialize, Serialize};

use crate::consts::{SCROLL_MID_FLOOR, SCROLL_MID_STEP};
use crate::media::{MediaSequence, SequenceKind};
use crate::model::CanvasModel;
use crate::page::{BackgroundKind, ImageAnimation, PageTemplate, TextBoxLayout, VisualMode, WebViewSource};
use crate::persisted::PersistedSequenceItem;

/// Persisted URLs for every media slot of one save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedMedia {
    pub background_url: Option<String>,
    pub background_audio_url: Option<String>,
    pub scroll_url: Option<String>,
    pub sound_effect_url: Option<String>,
    pub video_sequence: Vec<PersistedSequenceItem>,
    pub image_sequence: Vec<PersistedSequenceItem>,
}

impl ResolvedMedia {
    /// Carry over only what is already persisted: remote slot URLs and
    /// sequence items that have a URL. Staged files resolve to nothing.
    #[must_use]
    pub fn passthrough(model: &CanvasModel) -> Self {
        Self {
            background_url: model.background().remote_url().map(str::to_owned),
            background_audio_url: model.background_audio_url().map(str::to_owned),
            scroll_url: model.scroll().remote_url().map(str::to_owned),
            sound_effect_url: model.sound_effect().remote_url().map(str::to_owned),
            video_sequence: persisted_items(model.sequence(SequenceKind::Video)),
            image_sequence: persisted_items(model.sequence(SequenceKind::Image)),
        }
    }
}

fn persisted_items(sequence: &MediaSequence) -> Vec<PersistedSequenceItem> {
    sequence
        .items()
        .iter()
        .filter_map(|item| {
            let url = item.url.clone()?;
            Some(PersistedSequenceItem {
                url,
                filename: item.filename.clone(),
                order: item.order,
                audio_url: item.audio_url.clone(),
            })
        })
        .collect()
}

/// Body of a page create/update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub book_id: String,
    pub page_number: u32,

    pub background_url: String,
    pub background_type: BackgroundKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_audio_url: Option<String>,

    pub scroll_url: String,
    pub scroll_height: u32,
    pub scroll_mid_height: u32,
    pub scroll_max_height: u32,
    pub scroll_offset_y: f64,
    pub scroll_offset_x: f64,
    pub scroll_width: f64,

    pub sound_effect_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_effect_filename: Option<String>,

    pub text_boxes: Vec<TextBoxLayout>,

    pub is_coloring_page: bool,
    pub coloring_end_modal_only: bool,

    pub is_web_view_page: bool,
    pub web_view_source: WebViewSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_game_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_title: Option<String>,
    pub show_navigation_button: bool,

    pub use_video_sequence: bool,
    pub video_sequence: Vec<PersistedSequenceItem>,
    pub use_image_sequence: bool,
    pub image_sequence: Vec<PersistedSequenceItem>,
    pub image_sequence_duration: f64,
    pub image_sequence_animation: ImageAnimation,
}

/// The renderer's reduced scroll height for an authored height.
#[must_use]
pub fn scroll_mid_height(scroll_height: u32) -> u32 {
    scroll_height.saturating_sub(SCROLL_MID_STEP).max(SCROLL_MID_FLOOR)
}

/// Build the payload for `model` with media resolved to `media`.
///
/// Text boxes lose their client-only ids. A sequence is marked in use only
/// when its mode is active and at least one of its items resolved.
#[must_use]
pub fn assemble(model: &CanvasModel, book_id: &str, media: ResolvedMedia) -> SavePayload {
    let scroll_height = model.scroll_layout.height.percent();
    let mode = model.visual_mode();
    let use_video_sequence = mode == VisualMode::VideoSequence && !media.video_sequence.is_empty();
    let use_image_sequence = mode == VisualMode::ImageSequence && !media.image_sequence.is_empty();
    let web_view = &model.web_view;

    SavePayload {
        book_id: book_id.to_owned(),
        page_number: model.page_number,
        background_url: media.background_url.unwrap_or_default(),
        background_type: model.background_kind(),
        background_audio_url: media.background_audio_url,
        scroll_url: media.scroll_url.unwrap_or_default(),
        scroll_height,
        scroll_mid_height: scroll_mid_height(scroll_height),
        scroll_max_height: scroll_height,
        scroll_offset_y: model.scroll_layout.offset_y,
        scroll_offset_x: model.scroll_layout.offset_x,
        scroll_width: model.scroll_layout.width,
        sound_effect_url: media.sound_effect_url.unwrap_or_default(),
        sound_effect_filename: model.sound_effect_filename().map(str::to_owned),
        text_boxes: model.text_boxes().iter().map(|b| b.layout.clone()).collect(),
        is_coloring_page: model.coloring.enabled(),
        coloring_end_modal_only: model.coloring.end_modal_only(),
        is_web_view_page: web_view.enabled,
        web_view_source: web_view.source,
        web_view_url: web_view.url.clone(),
        web_view_game_id: web_view.game_id.clone(),
        web_view_title: web_view.title.clone(),
        show_navigation_button: web_view.show_navigation_button,
        use_video_sequence,
        video_sequence: media.video_sequence,
        use_image_sequence,
        image_sequence: media.image_sequence,
        image_sequence_duration: model.image_sequence_duration,
        image_sequence_animation: model.image_sequence_animation,
    }
}

impl SavePayload {
    /// Whether the page has a layout worth offering as a template.
    #[must_use]
    pub fn has_layout(&self) -> bool {
        !self.scroll_url.is_empty() || !self.text_boxes.is_empty()
    }

    /// Capture this page's scroll and text boxes as a template.
    #[must_use]
    pub fn to_template(&self) -> PageTemplate {
        PageTemplate {
            scroll_url: Some(self.scroll_url.clone()).filter(|u| !u.is_empty()),
            scroll_height: self.scroll_height,
            text_boxes: self.text_boxes.clone(),
        }
    }
}
