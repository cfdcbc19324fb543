use std::sync::Arc;

use super::*;
use crate::test_helpers::{RecordingPreviews, png};

fn staged_sequence(previews: &RecordingPreviews, count: usize) -> (MediaSequence, Vec<String>) {
    let mut sequence = MediaSequence::default();
    let ids = (0..count)
        .map(|i| sequence.push_file(png(&format!("frame{i}.png")), previews))
        .collect();
    (sequence, ids)
}

fn orders(sequence: &MediaSequence) -> Vec<u32> {
    sequence.items().iter().map(|i| i.order).collect()
}

// =============================================================
// URLs and files
// =============================================================

#[test]
fn remote_url_detection() {
    assert!(is_remote_url("https://cdn.example/bg.png"));
    assert!(is_remote_url("http://localhost/bg.png"));
    assert!(!is_remote_url("blob:1234"));
    assert!(!is_remote_url(""));
}

#[test]
fn content_type_guessed_from_extension() {
    assert_eq!(content_type_for("Cover.PNG"), "image/png");
    assert_eq!(content_type_for("clip.mp4"), "video/mp4");
    assert_eq!(content_type_for("pop.mp3"), "audio/mpeg");
    assert_eq!(content_type_for("noext"), "application/octet-stream");
}

#[test]
fn local_file_is_video() {
    assert!(LocalFile::new("a.webm", vec![]).is_video());
    assert!(!LocalFile::new("a.png", vec![]).is_video());
}

// =============================================================
// MemoryPreviews
// =============================================================

#[test]
fn memory_previews_create_fetch_release() {
    let previews = MemoryPreviews::new();
    let handle = previews.create(&png("a.png"));
    assert!(handle.starts_with("blob:"));
    assert_eq!(previews.fetch(&handle), Some(png("a.png").bytes));
    assert_eq!(previews.live(), 1);

    previews.release(&handle);
    assert_eq!(previews.fetch(&handle), None);
    assert_eq!(previews.live(), 0);
}

#[test]
fn memory_previews_release_unknown_is_noop() {
    let previews = MemoryPreviews::new();
    previews.release("blob:missing");
    assert_eq!(previews.live(), 0);
}

// =============================================================
// MediaSlot
// =============================================================

#[test]
fn slot_stage_creates_preview() {
    let previews = RecordingPreviews::default();
    let mut slot = MediaSlot::default();
    let handle = slot.stage(png("bg.png"), &previews);
    assert_eq!(slot.reference(), Some(handle.as_str()));
    assert_eq!(slot.staged_file().map(|f| f.name.as_str()), Some("bg.png"));
    assert_eq!(slot.remote_url(), None);
}

#[test]
fn slot_restage_releases_previous_preview() {
    let previews = RecordingPreviews::default();
    let mut slot = MediaSlot::default();
    let first = slot.stage(png("a.png"), &previews);
    let second = slot.stage(png("b.png"), &previews);
    assert_eq!(previews.created(), vec![first.clone(), second]);
    assert_eq!(previews.released(), vec![first]);
    assert_eq!(previews.live(), 1);
}

#[test]
fn slot_adopt_remote_releases_local_preview() {
    let previews = RecordingPreviews::default();
    let mut slot = MediaSlot::default();
    let handle = slot.stage(png("a.png"), &previews);
    slot.adopt(Some("https://x/a.png"), &previews);
    assert_eq!(previews.released(), vec![handle]);
    assert_eq!(slot.remote_url(), Some("https://x/a.png"));
    assert!(slot.staged_file().is_none());
}

#[test]
fn slot_clear_remote_releases_nothing() {
    let previews = RecordingPreviews::default();
    let mut slot = MediaSlot::remote(Some("https://x/a.png"));
    slot.clear(&previews);
    assert!(slot.is_empty());
    assert!(previews.released().is_empty());
}

#[test]
fn slot_remote_empty_string_is_empty() {
    assert!(MediaSlot::remote(Some("")).is_empty());
    assert!(MediaSlot::remote(None).is_empty());
}

// =============================================================
// MediaSequence
// =============================================================

#[test]
fn push_file_appends_in_order() {
    let previews = RecordingPreviews::default();
    let (sequence, _) = staged_sequence(&previews, 3);
    assert_eq!(orders(&sequence), vec![1, 2, 3]);
    assert!(sequence.items().iter().all(|i| i.preview.is_some() && i.file.is_some()));
}

#[test]
fn reorder_up_swaps_with_previous() {
    let previews = RecordingPreviews::default();
    let (mut sequence, ids) = staged_sequence(&previews, 3);
    assert!(sequence.reorder(&ids[2], Direction::Up));
    let order_of = |id: &str| sequence.get(id).map(|i| i.order);
    assert_eq!(order_of(&ids[2]), Some(2));
    assert_eq!(order_of(&ids[1]), Some(3));
    assert_eq!(sequence.items()[1].id, ids[2]);
}

#[test]
fn reorder_at_boundaries_is_noop() {
    let previews = RecordingPreviews::default();
    let (mut sequence, ids) = staged_sequence(&previews, 3);
    assert!(!sequence.reorder(&ids[0], Direction::Up));
    assert!(!sequence.reorder(&ids[2], Direction::Down));
    assert_eq!(orders(&sequence), vec![1, 2, 3]);
}

#[test]
fn reorder_up_repeatedly_settles_at_top() {
    let previews = RecordingPreviews::default();
    let (mut sequence, ids) = staged_sequence(&previews, 4);
    for _ in 0..10 {
        sequence.reorder(&ids[3], Direction::Up);
    }
    assert_eq!(sequence.items()[0].id, ids[3]);
    let snapshot = sequence.clone();
    assert!(!sequence.reorder(&ids[3], Direction::Up));
    assert_eq!(sequence, snapshot);
}

#[test]
fn reorder_unknown_id_is_noop() {
    let previews = RecordingPreviews::default();
    let (mut sequence, _) = staged_sequence(&previews, 2);
    assert!(!sequence.reorder("missing", Direction::Down));
}

#[test]
fn remove_renumbers_contiguously_and_releases() {
    let previews = RecordingPreviews::default();
    let (mut sequence, ids) = staged_sequence(&previews, 4);
    let removed_preview = sequence.get(&ids[1]).and_then(|i| i.preview.clone()).unwrap();

    assert!(sequence.remove(&ids[1], &previews));
    assert_eq!(orders(&sequence), vec![1, 2, 3]);
    assert_eq!(previews.released(), vec![removed_preview]);
}

#[test]
fn remove_renumbers_after_gaps_from_server() {
    let previews = RecordingPreviews::default();
    let mut sequence = MediaSequence::default();
    sequence.push_remote("a".into(), "https://x/1.png".into(), "1.png".into(), 2, None);
    sequence.push_remote("b".into(), "https://x/2.png".into(), "2.png".into(), 5, None);
    sequence.push_remote("c".into(), "https://x/3.png".into(), "3.png".into(), 9, None);
    sequence.remove("b", &previews);
    assert_eq!(orders(&sequence), vec![1, 2]);
    assert!(previews.released().is_empty());
}

#[test]
fn replace_file_releases_superseded_preview() {
    let previews = RecordingPreviews::default();
    let (mut sequence, ids) = staged_sequence(&previews, 1);
    let old = sequence.items()[0].preview.clone().unwrap();
    assert!(sequence.replace_file(&ids[0], png("new.png"), &previews));
    assert_eq!(previews.released(), vec![old]);
    assert_eq!(sequence.items()[0].filename, "new.png");
    assert_eq!(sequence.items()[0].order, 1);
}

#[test]
fn replace_file_drops_persisted_url_and_audio() {
    let previews = RecordingPreviews::default();
    let mut sequence = MediaSequence::default();
    sequence.push_remote("a".into(), "https://x/1.mp4".into(), "1.mp4".into(), 1, Some("https://x/1.mp3".into()));
    sequence.replace_file("a", png("2.mp4"), &previews);
    let item = &sequence.items()[0];
    assert_eq!(item.url, None);
    assert_eq!(item.audio_url, None);
}

#[test]
fn clear_releases_every_preview() {
    let previews = Arc::new(RecordingPreviews::default());
    let (mut sequence, _) = staged_sequence(&previews, 3);
    sequence.clear(previews.as_ref());
    assert!(sequence.is_empty());
    assert_eq!(previews.released().len(), 3);
    assert_eq!(previews.live(), 0);
}

#[test]
fn sequence_kind_labels() {
    assert_eq!(SequenceKind::Video.label(), "video-sequence");
    assert_eq!(SequenceKind::Image.label(), "image-sequence");
}
