//! Editing session for one book: the page list plus the create/edit mode.
//!
//! DESIGN
//! ======
//! [`EditorSession`] owns the [`EditorCore`] (and through it the Canvas
//! Model), the book's persisted pages sorted by page number, and the
//! current [`EditMode`]. Create is the initial mode and is re-entered after
//! every successful create-save and after deleting the page being edited.
//! Edit is entered only by selecting an existing page.
//!
//! Every operation takes `&mut self`, so at most one save can be in flight.
//!
//! ERROR HANDLING
//! ==============
//! - A missing book id turns every backend operation into a logged no-op.
//! - Collaborator failures surface as [`SessionError`] with server detail.
//! - Once a save or delete has succeeded, a failed refresh or template write
//!   is logged and the operation still reports success.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use canvas::editor::EditorCore;
use canvas::media::PreviewStore;
use canvas::model::CanvasModel;
use canvas::page::PageTemplate;
use canvas::payload::SavePayload;
use canvas::persisted::PersistedPage;
use tracing::{debug, info, warn};

use crate::api::{ApiError, PageApi, UploadApi};
use crate::template::{self, BulkApplyReport, TemplateStore};
use crate::upload::{self, SaveError, SaveOutcome};

const TEMPLATE_QUESTION: &str = "Save this page's scroll and text layout as the template for new pages in this book?";

// =============================================================================
// TYPES
// =============================================================================

/// Yes/no confirmation from the user.
pub trait Prompt: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
}

/// Whether a save creates a new page or updates an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Edit { page_id: String },
}

/// Collaborators a session talks to.
#[derive(Clone)]
pub struct Services {
    pub pages: Arc<dyn PageApi>,
    pub uploads: Arc<dyn UploadApi>,
    pub templates: Arc<dyn TemplateStore>,
    pub prompt: Arc<dyn Prompt>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("loading pages failed: {}", .0.detail())]
    Fetch(#[source] ApiError),

    #[error("page {0} is not in this book")]
    PageNotFound(String),

    #[error("deleting page failed: {}", .0.detail())]
    Delete(#[source] ApiError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error("layout can only be copied from page 1 while other pages exist")]
    BulkApplyUnavailable,
}

/// A completed save.
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub outcome: SaveOutcome,
    /// The page's layout was stored as the book's template.
    pub template_saved: bool,
}

// =============================================================================
// SESSION
// =============================================================================

pub struct EditorSession {
    book_id: String,
    services: Services,
    pages: Vec<PersistedPage>,
    next_page_number: u32,
    mode: EditMode,
    editor: EditorCore,
}

impl EditorSession {
    #[must_use]
    pub fn new(book_id: impl Into<String>, services: Services, previews: Arc<dyn PreviewStore>) -> Self {
        Self {
            book_id: book_id.into(),
            services,
            pages: Vec::new(),
            next_page_number: 1,
            mode: EditMode::Create,
            editor: EditorCore::new(CanvasModel::new(previews)),
        }
    }

    #[must_use]
    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    #[must_use]
    pub fn model(&self) -> &CanvasModel {
        &self.editor.model
    }

    pub fn model_mut(&mut self) -> &mut CanvasModel {
        &mut self.editor.model
    }

    pub fn editor_mut(&mut self) -> &mut EditorCore {
        &mut self.editor
    }

    /// Persisted pages, sorted by page number.
    #[must_use]
    pub fn pages(&self) -> &[PersistedPage] {
        &self.pages
    }

    #[must_use]
    pub fn next_page_number(&self) -> u32 {
        self.next_page_number
    }

    #[must_use]
    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    // --- Collection ---

    /// Load the book's pages. In create mode the canvas is reset to a new
    /// page numbered after the last one, with the book's template applied.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Fetch`] if the page list cannot be loaded.
    pub async fn fetch_pages(&mut self) -> Result<(), SessionError> {
        if self.book_id.is_empty() {
            debug!("no book selected; skipping page fetch");
            return Ok(());
        }
        self.reload_pages().await?;
        if self.mode == EditMode::Create {
            self.start_new_page().await;
        }
        Ok(())
    }

    /// Switch to create mode with a fresh canvas for the next page number.
    pub async fn start_new_page(&mut self) {
        self.mode = EditMode::Create;
        let template = self.stored_template().await;
        let model = &mut self.editor.model;
        model.reset(template.as_ref());
        model.page_number = self.next_page_number;
    }

    /// Load an existing page into the canvas; later saves update it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PageNotFound`] if the page is not in the list.
    pub fn select_page_for_editing(&mut self, page_id: &str) -> Result<(), SessionError> {
        let page = self
            .pages
            .iter()
            .find(|p| p.id == page_id)
            .ok_or_else(|| SessionError::PageNotFound(page_id.to_owned()))?;
        self.editor.model.load_from_persisted(page);
        self.mode = EditMode::Edit { page_id: page_id.to_owned() };
        Ok(())
    }

    /// Delete a page after the user confirms. Returns `false` when declined.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PageNotFound`] for an unknown page and
    /// [`SessionError::Delete`] if the backend rejects the delete.
    pub async fn delete_page(&mut self, page_id: &str) -> Result<bool, SessionError> {
        let page_number = self
            .pages
            .iter()
            .find(|p| p.id == page_id)
            .map(|p| p.page_number)
            .ok_or_else(|| SessionError::PageNotFound(page_id.to_owned()))?;

        let question = format!("Delete page {page_number}? This cannot be undone.");
        if !self.services.prompt.confirm(&question) {
            debug!(page_id, "delete declined");
            return Ok(false);
        }

        self.services.pages.delete_page(page_id).await.map_err(SessionError::Delete)?;
        info!(book_id = %self.book_id, page_id, page_number, "page deleted");

        self.refresh_after("delete").await;
        if matches!(&self.mode, EditMode::Edit { page_id: editing } if editing == page_id) {
            self.start_new_page().await;
        }
        Ok(true)
    }

    // --- Save ---

    /// Upload staged media and create or update the page.
    ///
    /// After a create of page 1 with a layout, and no template yet stored for
    /// the book, the user is asked whether to keep the layout as the template.
    /// A create returns the session to a fresh page; an update reloads the
    /// saved record and stays in edit mode. Returns `None` without a book.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Save`] if a blocking upload or the page
    /// request fails. The canvas is left as it was.
    pub async fn save(&mut self) -> Result<Option<SaveReport>, SessionError> {
        if self.book_id.is_empty() {
            debug!("no book selected; skipping save");
            return Ok(None);
        }

        let outcome = upload::save_page(
            self.services.pages.as_ref(),
            self.services.uploads.as_ref(),
            &self.editor.model,
            &self.book_id,
        )
        .await?;

        let template_saved = if outcome.created && outcome.payload.page_number == 1 {
            self.offer_template(&outcome.payload).await
        } else {
            false
        };

        self.refresh_after("save").await;
        if outcome.created {
            self.start_new_page().await;
        } else {
            self.editor.model.load_from_persisted(&outcome.page);
            self.mode = EditMode::Edit { page_id: outcome.page.id.clone() };
        }

        Ok(Some(SaveReport { outcome, template_saved }))
    }

    // --- Templates ---

    /// Copying the layout to every page is offered only while editing page 1
    /// and at least one other page exists.
    #[must_use]
    pub fn can_apply_layout_to_all(&self) -> bool {
        match &self.mode {
            EditMode::Edit { page_id } => {
                self.editor.model.page_number == 1 && self.pages.iter().any(|p| &p.id != page_id)
            }
            EditMode::Create => false,
        }
    }

    /// Copy the current scroll and text-box geometry onto every other page,
    /// with the text blanked.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::BulkApplyUnavailable`] when
    /// [`can_apply_layout_to_all`](Self::can_apply_layout_to_all) is false.
    pub async fn apply_layout_to_all_pages(&mut self) -> Result<BulkApplyReport, SessionError> {
        let EditMode::Edit { page_id } = &self.mode else {
            return Err(SessionError::BulkApplyUnavailable);
        };
        if !self.can_apply_layout_to_all() {
            return Err(SessionError::BulkApplyUnavailable);
        }

        let layout = self.editor.model.layout_template();
        let report = template::apply_layout_to_all_pages(
            self.services.pages.as_ref(),
            &self.book_id,
            &layout,
            &self.pages,
            page_id,
        )
        .await;
        self.refresh_after("layout copy").await;
        Ok(report)
    }

    async fn offer_template(&self, payload: &SavePayload) -> bool {
        if !payload.has_layout() {
            return false;
        }
        match self.services.templates.get(&self.book_id).await {
            Ok(Some(_)) => return false,
            Ok(None) => {}
            Err(e) => {
                warn!(book_id = %self.book_id, error = %e, "template lookup failed; not offering a template");
                return false;
            }
        }
        if !self.services.prompt.confirm(TEMPLATE_QUESTION) {
            return false;
        }
        match self.services.templates.put(&self.book_id, &payload.to_template()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(book_id = %self.book_id, error = %e, "template could not be stored");
                false
            }
        }
    }

    async fn stored_template(&self) -> Option<PageTemplate> {
        if self.book_id.is_empty() {
            return None;
        }
        match self.services.templates.get(&self.book_id).await {
            Ok(template) => template,
            Err(e) => {
                warn!(book_id = %self.book_id, error = %e, "template lookup failed; starting blank");
                None
            }
        }
    }

    // --- Refresh ---

    async fn reload_pages(&mut self) -> Result<(), SessionError> {
        let mut pages = self.services.pages.list_pages(&self.book_id).await.map_err(SessionError::Fetch)?;
        pages.sort_by_key(|p| p.page_number);
        self.next_page_number = pages.iter().map(|p| p.page_number).max().map_or(1, |max| max + 1);
        debug!(book_id = %self.book_id, pages = pages.len(), next = self.next_page_number, "pages loaded");
        self.pages = pages;
        Ok(())
    }

    async fn refresh_after(&mut self, operation: &str) {
        if let Err(e) = self.reload_pages().await {
            warn!(book_id = %self.book_id, operation, error = %e, "page list refresh failed");
        }
    }
}
