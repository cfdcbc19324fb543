//! Media upload orchestration and save dispatch.
//!
//! DESIGN
//! ======
//! A save turns every staged local file on the Canvas Model into a persisted
//! URL, assembles the payload, and creates or updates the page. Uploads run
//! one at a time in a fixed order: background, scroll, sound effect, video
//! sequence items, image sequence items. Already-persisted URLs pass through
//! untouched. The model is only read here; callers reload it from the saved
//! record afterwards.
//!
//! ERROR HANDLING
//! ==============
//! - Background, scroll and sound-effect upload failures abort the save.
//! - A scroll whose local reference can no longer be read is dropped with a
//!   warning and the save continues.
//! - A failed sequence item is reported and skipped; the rest still upload.

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

use std::fmt;

use canvas::media::{LocalFile, MediaSequence, MediaSlot, SequenceKind, is_remote_url};
use canvas::model::CanvasModel;
use canvas::page::BackgroundKind;
use canvas::payload::{ResolvedMedia, SavePayload, assemble};
use canvas::persisted::{PersistedPage, PersistedSequenceItem};
use tracing::{info, warn};

use crate::api::{ApiError, PageApi, UploadApi, UploadKind, UploadTarget, UploadedMedia};

/// Filename given to scroll bytes recovered from a preview reference.
const RECOVERED_SCROLL_NAME: &str = "scroll.png";

// =============================================================================
// TYPES
// =============================================================================

/// The single-file media slots of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Background,
    Scroll,
    SoundEffect,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Background => "background",
            Self::Scroll => "scroll",
            Self::SoundEffect => "sound effect",
        })
    }
}

/// Save-blocking failures. The Canvas Model is unchanged when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("{slot} upload failed: {}", .source.detail())]
    Upload {
        slot: Slot,
        #[source]
        source: ApiError,
    },

    #[error("saving page failed: {}", .0.detail())]
    Save(#[source] ApiError),
}

/// A non-fatal problem reported alongside a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveWarning {
    /// The scroll's local reference could not be read; it was left out.
    ScrollCleared { reference: String },
    /// One sequence item failed to upload and was left out.
    SequenceItemFailed { kind: SequenceKind, filename: String, detail: String },
}

impl fmt::Display for SaveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScrollCleared { .. } => {
                f.write_str("scroll image could not be read and was removed; attach it again")
            }
            Self::SequenceItemFailed { kind, filename, detail } => {
                write!(f, "{} item {filename} failed to upload: {detail}", kind.label())
            }
        }
    }
}

/// Everything a save produced.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// Record returned by the backend.
    pub page: PersistedPage,
    /// The payload that was sent.
    pub payload: SavePayload,
    pub warnings: Vec<SaveWarning>,
    /// `true` for a create, `false` for an update.
    pub created: bool,
}

// =============================================================================
// SAVE
// =============================================================================

/// Upload staged media, assemble the payload, and create or update the page.
///
/// # Errors
///
/// Returns [`SaveError`] if a slot upload or the page request fails.
pub async fn save_page(
    pages: &dyn PageApi,
    uploads: &dyn UploadApi,
    model: &CanvasModel,
    book_id: &str,
) -> Result<SaveOutcome, SaveError> {
    let (media, warnings) = resolve_media(uploads, model, book_id).await?;
    let payload = assemble(model, book_id, media);

    let (page, created) = match model.page_id() {
        Some(page_id) => (pages.update_page(page_id, &payload).await.map_err(SaveError::Save)?, false),
        None => (pages.create_page(&payload).await.map_err(SaveError::Save)?, true),
    };

    info!(
        book_id,
        page_id = %page.id,
        page_number = payload.page_number,
        created,
        warnings = warnings.len(),
        "page saved"
    );
    Ok(SaveOutcome { page, payload, warnings, created })
}

/// Turn every media slot and sequence item into a persisted URL.
///
/// # Errors
///
/// Returns [`SaveError::Upload`] if a background, scroll or sound-effect
/// upload fails.
pub async fn resolve_media(
    uploads: &dyn UploadApi,
    model: &CanvasModel,
    book_id: &str,
) -> Result<(ResolvedMedia, Vec<SaveWarning>), SaveError> {
    let target = |media_type: &str| UploadTarget {
        book_id: book_id.to_owned(),
        media_type: media_type.to_owned(),
        page_number: model.page_number,
    };
    let mut warnings = Vec::new();

    // --- Background ---
    let background_kind = match model.background_kind() {
        BackgroundKind::Video => UploadKind::Video,
        BackgroundKind::Image => UploadKind::Image,
    };
    let (background_url, background_audio_url) =
        match upload_slot(uploads, model.background(), background_kind, &target("background"))
            .await
            .map_err(|source| SaveError::Upload { slot: Slot::Background, source })?
        {
            SlotResolution::Reused(url) => (Some(url), model.background_audio_url().map(str::to_owned)),
            SlotResolution::Uploaded(media) => (Some(media.url), media.background_audio_url),
            SlotResolution::Unbacked(_) | SlotResolution::Empty => (None, None),
        };

    // --- Scroll ---
    let scroll_url = match upload_slot(uploads, model.scroll(), UploadKind::Image, &target("scroll"))
        .await
        .map_err(|source| SaveError::Upload { slot: Slot::Scroll, source })?
    {
        SlotResolution::Reused(url) => Some(url),
        SlotResolution::Uploaded(media) => Some(media.url),
        SlotResolution::Unbacked(reference) => match model.previews().fetch(&reference) {
            Some(bytes) => {
                let file = LocalFile::new(RECOVERED_SCROLL_NAME, bytes);
                let media = uploads
                    .upload(UploadKind::Image, &target("scroll"), &file)
                    .await
                    .map_err(|source| SaveError::Upload { slot: Slot::Scroll, source })?;
                Some(media.url)
            }
            None => {
                warn!(%reference, "scroll preview no longer readable; saving without scroll");
                warnings.push(SaveWarning::ScrollCleared { reference });
                None
            }
        },
        SlotResolution::Empty => None,
    };

    // --- Sound effect ---
    let sound_effect_url =
        match upload_slot(uploads, model.sound_effect(), UploadKind::SoundEffect, &target("sound-effect"))
            .await
            .map_err(|source| SaveError::Upload { slot: Slot::SoundEffect, source })?
        {
            SlotResolution::Reused(url) => Some(url),
            SlotResolution::Uploaded(media) => Some(media.url),
            SlotResolution::Unbacked(_) | SlotResolution::Empty => None,
        };

    // --- Sequences ---
    let video = SequenceKind::Video;
    let video_sequence =
        upload_sequence(uploads, model.sequence(video), video, &target(video.label()), &mut warnings).await;
    let image = SequenceKind::Image;
    let image_sequence =
        upload_sequence(uploads, model.sequence(image), image, &target(image.label()), &mut warnings).await;

    let media = ResolvedMedia {
        background_url,
        background_audio_url,
        scroll_url,
        sound_effect_url,
        video_sequence,
        image_sequence,
    };
    Ok((media, warnings))
}

// =============================================================================
// SLOTS
// =============================================================================

enum SlotResolution {
    /// Already persisted; reuse verbatim.
    Reused(String),
    /// A staged file was uploaded.
    Uploaded(UploadedMedia),
    /// A local reference with no staged file behind it.
    Unbacked(String),
    Empty,
}

async fn upload_slot(
    uploads: &dyn UploadApi,
    slot: &MediaSlot,
    kind: UploadKind,
    target: &UploadTarget,
) -> Result<SlotResolution, ApiError> {
    if let Some(url) = slot.remote_url() {
        return Ok(SlotResolution::Reused(url.to_owned()));
    }
    if let Some(file) = slot.staged_file() {
        return uploads.upload(kind, target, file).await.map(SlotResolution::Uploaded);
    }
    Ok(match slot.reference() {
        Some(reference) if !reference.is_empty() && !is_remote_url(reference) => {
            SlotResolution::Unbacked(reference.to_owned())
        }
        _ => SlotResolution::Empty,
    })
}

// =============================================================================
// SEQUENCES
// =============================================================================

/// Uploads staged items and keeps remote ones. Items that fail or have no
/// media are dropped and the survivors are renumbered from 1.
async fn upload_sequence(
    uploads: &dyn UploadApi,
    sequence: &MediaSequence,
    kind: SequenceKind,
    target: &UploadTarget,
    warnings: &mut Vec<SaveWarning>,
) -> Vec<PersistedSequenceItem> {
    let upload_kind = match kind {
        SequenceKind::Video => UploadKind::Video,
        SequenceKind::Image => UploadKind::Image,
    };
    let mut resolved = Vec::with_capacity(sequence.len());

    for item in sequence.items() {
        let (url, audio_url) = if let Some(file) = &item.file {
            match uploads.upload(upload_kind, target, file).await {
                Ok(media) => (media.url, media.background_audio_url),
                Err(e) => {
                    warn!(sequence = kind.label(), filename = %item.filename, error = %e, "sequence item upload failed");
                    warnings.push(SaveWarning::SequenceItemFailed {
                        kind,
                        filename: item.filename.clone(),
                        detail: e.detail(),
                    });
                    continue;
                }
            }
        } else if let Some(url) = &item.url {
            (url.clone(), item.audio_url.clone())
        } else {
            continue;
        };

        resolved.push(PersistedSequenceItem {
            url,
            filename: item.filename.clone(),
            order: u32::try_from(resolved.len() + 1).unwrap_or(u32::MAX),
            audio_url: match kind {
                SequenceKind::Video => audio_url,
                SequenceKind::Image => None,
            },
        });
    }
    resolved
}
