//! Media handles: staged local files, preview references, and sequences.
//!
//! A media reference is either a persisted remote URL (`https://...`) or a
//! local preview handle (`blob:<uuid>`) pointing at bytes held by a
//! [`PreviewStore`]. Local handles are owned by whichever slot or sequence
//! item created them and must be released through the store when that owner
//! drops them, or the bytes stay pinned in memory.

#[cfg(test)]
#[path = "media_test.rs"]
mod media_test;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use crate::consts::PREVIEW_SCHEME;

/// True for persisted URLs the server can serve back.
#[must_use]
pub fn is_remote_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// A file selected by the author, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    /// Build a file, guessing the content type from the name's extension.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = content_type_for(&name).to_owned();
        Self { name, content_type, bytes }
    }

    /// Whether the file is a video by content type.
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.content_type.starts_with("video/")
    }
}

/// Content type for common image, video and audio extensions.
#[must_use]
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// PREVIEW STORE
// =============================================================================

/// Holder of the bytes behind local preview handles.
pub trait PreviewStore: Send + Sync {
    /// Register a file's bytes and return a fresh `blob:` handle for them.
    fn create(&self, file: &LocalFile) -> String;

    /// Drop the bytes behind a handle. Unknown handles are ignored.
    fn release(&self, handle: &str);

    /// Read back the bytes behind a handle, if it is still live.
    fn fetch(&self, handle: &str) -> Option<Vec<u8>>;
}

/// In-process [`PreviewStore`].
#[derive(Debug, Default)]
pub struct MemoryPreviews {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryPreviews {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live handles.
    #[must_use]
    pub fn live(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl PreviewStore for MemoryPreviews {
    fn create(&self, file: &LocalFile) -> String {
        let handle = format!("{PREVIEW_SCHEME}{}", Uuid::new_v4());
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.clone(), file.bytes.clone());
        handle
    }

    fn release(&self, handle: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(handle);
    }

    fn fetch(&self, handle: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(handle)
            .cloned()
    }
}

fn release_local(previews: &dyn PreviewStore, reference: Option<&str>) {
    if let Some(handle) = reference.filter(|r| !is_remote_url(r)) {
        previews.release(handle);
    }
}

// =============================================================================
// MEDIA SLOT
// =============================================================================

/// A single-file media slot: background, scroll image, or sound effect.
///
/// `reference` is what the canvas renders: a remote URL, or a local handle.
/// A local handle normally has the staged `file` alongside it; one without a
/// file is an unbacked reference whose bytes may or may not still resolve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaSlot {
    reference: Option<String>,
    file: Option<LocalFile>,
}

impl MediaSlot {
    /// A slot holding an already-persisted URL. Empty strings give an empty slot.
    #[must_use]
    pub fn remote(url: Option<&str>) -> Self {
        Self { reference: url.filter(|u| !u.is_empty()).map(str::to_owned), file: None }
    }

    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    #[must_use]
    pub fn staged_file(&self) -> Option<&LocalFile> {
        self.file.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reference.is_none()
    }

    /// The persisted URL, if the reference is one.
    #[must_use]
    pub fn remote_url(&self) -> Option<&str> {
        self.reference.as_deref().filter(|r| is_remote_url(r))
    }

    /// Stage a new file, releasing whatever local preview it replaces.
    /// Returns the new preview handle.
    pub fn stage(&mut self, file: LocalFile, previews: &dyn PreviewStore) -> String {
        release_local(previews, self.reference.as_deref());
        let handle = previews.create(&file);
        self.reference = Some(handle.clone());
        self.file = Some(file);
        handle
    }

    /// Point the slot at an existing reference with no staged file.
    pub fn adopt(&mut self, reference: Option<&str>, previews: &dyn PreviewStore) {
        release_local(previews, self.reference.as_deref());
        self.reference = reference.filter(|r| !r.is_empty()).map(str::to_owned);
        self.file = None;
    }

    /// Empty the slot, releasing its local preview.
    pub fn clear(&mut self, previews: &dyn PreviewStore) {
        self.adopt(None, previews);
    }
}

// =============================================================================
// SEQUENCES
// =============================================================================

/// Which media sequence an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Video,
    Image,
}

impl SequenceKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Video => "video-sequence",
            Self::Image => "image-sequence",
        }
    }
}

/// Direction for [`MediaSequence::reorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// One frame or clip of a media sequence.
///
/// Before upload an item carries its staged `file` and a local `preview`.
/// After a save round-trip only `url`, `filename`, `order` and (for video)
/// `audio_url` remain.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceItem {
    pub id: String,
    pub url: Option<String>,
    pub file: Option<LocalFile>,
    pub filename: String,
    pub order: u32,
    pub preview: Option<String>,
    pub audio_url: Option<String>,
}

/// An ordered media sequence. Items are kept sorted by `order`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaSequence {
    items: Vec<SequenceItem>,
}

impl MediaSequence {
    #[must_use]
    pub fn items(&self) -> &[SequenceItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SequenceItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn next_order(&self) -> u32 {
        self.items.iter().map(|item| item.order).max().unwrap_or(0) + 1
    }

    /// Append a staged file at the end of the sequence. Returns the item id.
    pub fn push_file(&mut self, file: LocalFile, previews: &dyn PreviewStore) -> String {
        let id = Uuid::new_v4().to_string();
        let preview = previews.create(&file);
        self.items.push(SequenceItem {
            id: id.clone(),
            url: None,
            filename: file.name.clone(),
            file: Some(file),
            order: self.next_order(),
            preview: Some(preview),
            audio_url: None,
        });
        id
    }

    /// Append an already-persisted item, keeping its stored order.
    pub fn push_remote(&mut self, id: String, url: String, filename: String, order: u32, audio_url: Option<String>) {
        self.items.push(SequenceItem {
            id,
            url: Some(url),
            file: None,
            filename,
            order,
            preview: None,
            audio_url,
        });
        self.items.sort_by_key(|item| item.order);
    }

    /// Swap an item's order with its neighbor. No-op at either end.
    /// Returns whether anything moved.
    pub fn reorder(&mut self, id: &str, direction: Direction) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return false;
        };
        let neighbor = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.items.len() => index + 1,
            _ => return false,
        };
        let order = self.items[index].order;
        self.items[index].order = self.items[neighbor].order;
        self.items[neighbor].order = order;
        self.items.swap(index, neighbor);
        true
    }

    /// Remove an item, release its preview, and renumber the rest `1..=N`.
    pub fn remove(&mut self, id: &str, previews: &dyn PreviewStore) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return false;
        };
        let removed = self.items.remove(index);
        release_local(previews, removed.preview.as_deref());
        self.renumber();
        true
    }

    /// Replace an item's staged file, releasing the preview it supersedes.
    pub fn replace_file(&mut self, id: &str, file: LocalFile, previews: &dyn PreviewStore) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        release_local(previews, item.preview.as_deref());
        item.preview = Some(previews.create(&file));
        item.filename.clone_from(&file.name);
        item.file = Some(file);
        item.url = None;
        item.audio_url = None;
        true
    }

    /// Release every local preview and empty the sequence.
    pub fn clear(&mut self, previews: &dyn PreviewStore) {
        for item in self.items.drain(..) {
            release_local(previews, item.preview.as_deref());
        }
    }

    fn renumber(&mut self) {
        for (order, item) in (1u32..).zip(self.items.iter_mut()) {
            item.order = order;
        }
    }
}
