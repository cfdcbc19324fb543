//! Page layout templates keyed by book.
//!
//! DESIGN
//! ======
//! A template is page 1's scroll and text-box layout, offered for reuse when
//! new pages of the same book are created. Storage sits behind the async
//! [`TemplateStore`] trait: [`FileTemplateStore`] keeps one JSON map on disk,
//! [`MemoryTemplateStore`] backs tests and one-off sessions.
//!
//! The bulk "apply to every page" operation lives here too. It copies the
//! current layout onto every other page with the text blanked, one update
//! per page, and keeps going past failures.

#[cfg(test)]
#[path = "template_test.rs"]
mod template_test;

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use canvas::media::MemoryPreviews;
use canvas::model::CanvasModel;
use canvas::page::PageTemplate;
use canvas::payload::{ResolvedMedia, assemble};
use canvas::persisted::PersistedPage;
use tracing::{info, warn};

use crate::api::PageApi;

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template store {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template store {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn get(&self, book_id: &str) -> Result<Option<PageTemplate>, TemplateError>;
    async fn put(&self, book_id: &str, template: &PageTemplate) -> Result<(), TemplateError>;
    /// Returns whether a template was stored.
    async fn remove(&self, book_id: &str) -> Result<bool, TemplateError>;
}

/// In-process template store.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: Mutex<BTreeMap<String, PageTemplate>>,
}

impl MemoryTemplateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, PageTemplate>> {
        self.templates.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn get(&self, book_id: &str) -> Result<Option<PageTemplate>, TemplateError> {
        Ok(self.lock().get(book_id).cloned())
    }

    async fn put(&self, book_id: &str, template: &PageTemplate) -> Result<(), TemplateError> {
        self.lock().insert(book_id.to_owned(), template.clone());
        Ok(())
    }

    async fn remove(&self, book_id: &str) -> Result<bool, TemplateError> {
        Ok(self.lock().remove(book_id).is_some())
    }
}

/// Templates for every book in one JSON object on disk, keyed by book id.
///
/// Writes go to a sibling temp file first and are renamed into place.
/// A missing file reads as empty.
#[derive(Debug)]
pub struct FileTemplateStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileTemplateStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: tokio::sync::Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, PageTemplate>, TemplateError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(TemplateError::Io { path: self.path.clone(), source }),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| TemplateError::Parse { path: self.path.clone(), source })
    }

    async fn write_all(&self, templates: &BTreeMap<String, PageTemplate>) -> Result<(), TemplateError> {
        let io_err = |source: std::io::Error| TemplateError::Io { path: self.path.clone(), source };
        let json = serde_json::to_vec_pretty(templates)
            .map_err(|source| TemplateError::Parse { path: self.path.clone(), source })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let tmp = self.path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)
    }
}

#[async_trait]
impl TemplateStore for FileTemplateStore {
    async fn get(&self, book_id: &str) -> Result<Option<PageTemplate>, TemplateError> {
        Ok(self.read_all().await?.remove(book_id))
    }

    async fn put(&self, book_id: &str, template: &PageTemplate) -> Result<(), TemplateError> {
        let _guard = self.write_lock.lock().await;
        let mut templates = self.read_all().await?;
        templates.insert(book_id.to_owned(), template.clone());
        self.write_all(&templates).await?;
        info!(book_id, path = %self.path.display(), "template saved");
        Ok(())
    }

    async fn remove(&self, book_id: &str) -> Result<bool, TemplateError> {
        let _guard = self.write_lock.lock().await;
        let mut templates = self.read_all().await?;
        if templates.remove(book_id).is_none() {
            return Ok(false);
        }
        self.write_all(&templates).await?;
        info!(book_id, path = %self.path.display(), "template removed");
        Ok(true)
    }
}

// =============================================================================
// BULK APPLY
// =============================================================================

/// Result of copying a layout onto the other pages of a book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkApplyReport {
    /// Pages updated successfully.
    pub updated: usize,
    /// `(page_number, detail)` for every page that failed.
    pub failed: Vec<(u32, String)>,
}

/// Copy `layout`'s scroll and text-box geometry onto every page except
/// `source_page_id`, blanking the copied text.
///
/// Each page keeps everything else it had: background, sound effect,
/// sequences, modes, and scroll placement.
pub async fn apply_layout_to_all_pages(
    api: &dyn PageApi,
    book_id: &str,
    layout: &PageTemplate,
    pages: &[PersistedPage],
    source_page_id: &str,
) -> BulkApplyReport {
    let layout = layout.without_text();
    let scratch_previews = Arc::new(MemoryPreviews::new());
    let mut report = BulkApplyReport::default();

    for page in pages.iter().filter(|p| p.id != source_page_id) {
        let mut model = CanvasModel::new(scratch_previews.clone());
        model.load_from_persisted(page);
        model.apply_template(&layout);
        let payload = assemble(&model, book_id, ResolvedMedia::passthrough(&model));

        match api.update_page(&page.id, &payload).await {
            Ok(_) => report.updated += 1,
            Err(e) => {
                warn!(page_id = %page.id, page_number = page.page_number, error = %e, "layout copy failed");
                report.failed.push((page.page_number, e.detail()));
            }
        }
    }

    info!(book_id, updated = report.updated, failed = report.failed.len(), "layout applied to pages");
    report
}
