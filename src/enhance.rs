//! Text-to-speech prompt enhancement for text boxes.
//!
//! The enhancement service rewrites a box's text with emotion or
//! sound-effect markup; the result replaces the box's text in place.

#[cfg(test)]
#[path = "enhance_test.rs"]
mod enhance_test;

use canvas::model::CanvasModel;
use canvas::page::PartialTextBox;
use tracing::{debug, info};

use crate::api::{ApiError, ClearCacheResult, EnhanceApi, EnhanceKind};

#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    #[error("text box {0} does not exist")]
    UnknownTextBox(String),

    #[error("text enhancement failed: {}", .0.detail())]
    Api(#[source] ApiError),
}

/// Replace a text box's text with its enhanced form.
///
/// Returns `false` without calling the service when the text is blank.
///
/// # Errors
///
/// Returns [`EnhanceError::UnknownTextBox`] for a missing box and
/// [`EnhanceError::Api`] if the service call fails. The box is unchanged on
/// error.
pub async fn enhance_text_box(
    api: &dyn EnhanceApi,
    model: &mut CanvasModel,
    box_id: &str,
    kind: EnhanceKind,
) -> Result<bool, EnhanceError> {
    let text = model
        .text_box(box_id)
        .map(|b| b.layout.text.clone())
        .ok_or_else(|| EnhanceError::UnknownTextBox(box_id.to_owned()))?;
    if text.trim().is_empty() {
        debug!(box_id, "blank text; nothing to enhance");
        return Ok(false);
    }

    let enhanced = api.enhance(kind, &text).await.map_err(EnhanceError::Api)?;
    model.update_text_box(box_id, &PartialTextBox::text(enhanced));
    info!(box_id, ?kind, "text enhanced");
    Ok(true)
}

/// Drop the book's cached speech audio. Returns `None` without a book.
///
/// # Errors
///
/// Returns [`EnhanceError::Api`] if the service call fails.
pub async fn clear_tts_cache(api: &dyn EnhanceApi, book_id: &str) -> Result<Option<ClearCacheResult>, EnhanceError> {
    if book_id.is_empty() {
        debug!("no book selected; skipping cache clear");
        return Ok(None);
    }
    let result = api.clear_cache(book_id).await.map_err(EnhanceError::Api)?;
    info!(book_id, deleted = result.deleted_count, "speech cache cleared");
    Ok(Some(result))
}
