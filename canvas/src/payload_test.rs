#![allow(clippy::float_cmp)]

use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::media::LocalFile;
use crate::page::ScrollHeight;
use crate::persisted::PersistedPage;
use crate::test_helpers::{RecordingPreviews, model_with, mp4, png};

fn item(url: &str, order: u32) -> PersistedSequenceItem {
    PersistedSequenceItem { url: url.into(), filename: url.rsplit('/').next().unwrap_or_default().into(), order, audio_url: None }
}

// =============================================================
// Scroll heights
// =============================================================

#[test]
fn scroll_mid_height_for_each_state() {
    assert_eq!(scroll_mid_height(0), 30);
    assert_eq!(scroll_mid_height(30), 30);
    assert_eq!(scroll_mid_height(60), 30);
    assert_eq!(scroll_mid_height(90), 60);
}

#[test]
fn payload_scroll_heights_follow_scroll_state() {
    let previews = Arc::new(RecordingPreviews::default());
    let mut model = model_with(&previews);
    for (height, max, mid) in [(ScrollHeight::Hidden, 0, 30), (ScrollHeight::Mid, 30, 30), (ScrollHeight::Max, 60, 30)] {
        model.set_scroll_height(height);
        let payload = assemble(&model, "b1", ResolvedMedia::default());
        assert_eq!(payload.scroll_height, max);
        assert_eq!(payload.scroll_max_height, max);
        assert_eq!(payload.scroll_mid_height, mid);
    }
}

// =============================================================
// Assembly
// =============================================================

#[test]
fn round_trip_through_persisted_record() {
    let previews = Arc::new(RecordingPreviews::default());
    let mut model = model_with(&previews);
    model.set_background_url(BackgroundKind::Image, "https://x/bg.png");
    model.set_scroll_height(ScrollHeight::Max);
    model.add_text_box();
    let second = model.add_text_box();
    model.update_text_box(&second, &crate::page::PartialTextBox::text("Hello"));

    let payload = assemble(&model, "b1", ResolvedMedia::passthrough(&model));
    let mut record = serde_json::to_value(&payload).unwrap();
    record["_id"] = json!("p1");
    let persisted: PersistedPage = serde_json::from_value(record).unwrap();

    let mut reloaded = model_with(&previews);
    reloaded.load_from_persisted(&persisted);
    assert_eq!(reloaded.background().remote_url(), Some("https://x/bg.png"));
    assert_eq!(reloaded.background_kind(), BackgroundKind::Image);
    assert_eq!(reloaded.scroll_layout.height, ScrollHeight::Max);
    let texts: Vec<&str> = reloaded.text_boxes().iter().map(|b| b.layout.text.as_str()).collect();
    assert_eq!(texts, vec!["New Text", "Hello"]);
}

#[test]
fn text_boxes_lose_client_ids() {
    let previews = Arc::new(RecordingPreviews::default());
    let mut model = model_with(&previews);
    model.add_text_box();
    let json = serde_json::to_value(assemble(&model, "b1", ResolvedMedia::default())).unwrap();
    assert!(json["textBoxes"][0].get("id").is_none());
    assert_eq!(json["textBoxes"][0]["text"], "New Text");
}

#[test]
fn unresolved_slots_are_empty_strings() {
    let previews = Arc::new(RecordingPreviews::default());
    let model = model_with(&previews);
    let json = serde_json::to_value(assemble(&model, "b1", ResolvedMedia::default())).unwrap();
    assert_eq!(json["backgroundUrl"], "");
    assert_eq!(json["scrollUrl"], "");
    assert_eq!(json["soundEffectUrl"], "");
    assert!(json.get("backgroundAudioUrl").is_none());
    assert_eq!(json["bookId"], "b1");
}

#[test]
fn passthrough_skips_staged_files() {
    let previews = Arc::new(RecordingPreviews::default());
    let mut model = model_with(&previews);
    model.set_background_source(BackgroundKind::Image, png("bg.png"));
    model.set_sound_effect(LocalFile::new("pop.mp3", vec![1]));
    model.add_sequence_file(SequenceKind::Video, mp4("1.mp4"));
    let media = ResolvedMedia::passthrough(&model);
    assert_eq!(media.background_url, None);
    assert_eq!(media.sound_effect_url, None);
    assert!(media.video_sequence.is_empty());
}

#[test]
fn sequence_flag_requires_active_mode_and_items() {
    let previews = Arc::new(RecordingPreviews::default());
    let mut model = model_with(&previews);
    model.toggle_video_sequence_mode(true);

    let empty = assemble(&model, "b1", ResolvedMedia::default());
    assert!(!empty.use_video_sequence);

    let media = ResolvedMedia { video_sequence: vec![item("https://x/1.mp4", 1)], ..Default::default() };
    let payload = assemble(&model, "b1", media.clone());
    assert!(payload.use_video_sequence);
    assert!(!payload.use_image_sequence);

    model.toggle_video_sequence_mode(false);
    let payload = assemble(&model, "b1", media);
    assert!(!payload.use_video_sequence);
    assert_eq!(payload.video_sequence.len(), 1);
}

#[test]
fn image_sequence_settings_carried() {
    let previews = Arc::new(RecordingPreviews::default());
    let mut model = model_with(&previews);
    model.toggle_image_sequence_mode(true);
    model.image_sequence_duration = 2.5;
    model.image_sequence_animation = ImageAnimation::PanLeft;
    let media = ResolvedMedia { image_sequence: vec![item("https://x/1.png", 1)], ..Default::default() };
    let json = serde_json::to_value(assemble(&model, "b1", media)).unwrap();
    assert_eq!(json["useImageSequence"], true);
    assert_eq!(json["imageSequenceDuration"], 2.5);
    assert_eq!(json["imageSequenceAnimation"], "panLeft");
}

#[test]
fn coloring_and_web_view_carried() {
    let previews = Arc::new(RecordingPreviews::default());
    let mut model = model_with(&previews);
    model.coloring.set_enabled(true);
    model.coloring.set_end_modal_only(true);
    model.web_view.enabled = true;
    model.web_view.select_game("g1", "https://games/puzzle", "Puzzle");
    let json = serde_json::to_value(assemble(&model, "b1", ResolvedMedia::default())).unwrap();
    assert_eq!(json["isColoringPage"], true);
    assert_eq!(json["coloringEndModalOnly"], true);
    assert_eq!(json["isWebViewPage"], true);
    assert_eq!(json["webViewSource"], "game");
    assert_eq!(json["webViewGameId"], "g1");
    assert_eq!(json["showNavigationButton"], true);
}

// =============================================================
// Templates
// =============================================================

#[test]
fn to_template_captures_scroll_and_boxes() {
    let previews = Arc::new(RecordingPreviews::default());
    let mut model = model_with(&previews);
    model.set_scroll_reference(Some("https://x/scroll.png"));
    model.set_scroll_height(ScrollHeight::Mid);
    model.add_text_box();
    let payload = assemble(&model, "b1", ResolvedMedia::passthrough(&model));
    assert!(payload.has_layout());

    let template = payload.to_template();
    assert_eq!(template.scroll_url.as_deref(), Some("https://x/scroll.png"));
    assert_eq!(template.scroll_height, 30);
    assert_eq!(template.text_boxes.len(), 1);
}

#[test]
fn empty_page_has_no_layout() {
    let previews = Arc::new(RecordingPreviews::default());
    let model = model_with(&previews);
    let payload = assemble(&model, "b1", ResolvedMedia::default());
    assert!(!payload.has_layout());
    assert_eq!(payload.to_template().scroll_url, None);
}
