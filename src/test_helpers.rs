//! In-memory backend and fixtures shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use canvas::media::{LocalFile, MemoryPreviews, PreviewStore};
use canvas::model::CanvasModel;
use canvas::payload::SavePayload;
use canvas::persisted::PersistedPage;

use crate::api::{
    ApiError, Book, CatalogApi, ClearCacheResult, EnhanceApi, EnhanceKind, Game, PageApi, UploadApi, UploadKind,
    UploadTarget, UploadedMedia,
};
use crate::session::Prompt;

// =========================================================================
// MockApi
// =========================================================================

/// Backend fake: stores pages in memory and answers uploads with
/// deterministic CDN URLs.
#[derive(Default)]
pub struct MockApi {
    pub pages: Mutex<Vec<PersistedPage>>,
    /// One line per call, in order.
    pub calls: Mutex<Vec<String>>,
    /// Filenames whose upload returns a 500.
    pub failing_uploads: Mutex<Vec<String>>,
    /// Page ids whose update returns a 500.
    pub failing_updates: Mutex<Vec<String>>,
    pub fail_create: Mutex<bool>,
    pub fail_list: Mutex<bool>,
    pub games: Mutex<Vec<Game>>,
    pub book: Mutex<Book>,
    pub deleted_count: Mutex<u64>,
    next_id: Mutex<u32>,
}

impl MockApi {
    pub fn with_pages(pages: Vec<PersistedPage>) -> Arc<Self> {
        let api = Self::default();
        *api.pages.lock().unwrap() = pages;
        Arc::new(api)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn upload_calls(&self) -> Vec<String> {
        self.calls().into_iter().filter(|c| c.starts_with("upload ")).collect()
    }

    pub fn stored(&self, page_id: &str) -> Option<PersistedPage> {
        self.pages.lock().unwrap().iter().find(|p| p.id == page_id).cloned()
    }

    pub fn fail_upload_of(&self, filename: &str) {
        self.failing_uploads.lock().unwrap().push(filename.to_owned());
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn server_error() -> ApiError {
        ApiError::Response { status: 500, body: r#"{"message":"storage unavailable"}"#.into() }
    }
}

/// What the backend would store for a payload.
pub fn record_from_payload(id: &str, payload: &SavePayload) -> PersistedPage {
    let mut value = serde_json::to_value(payload).unwrap();
    value["_id"] = serde_json::Value::String(id.to_owned());
    serde_json::from_value(value).unwrap()
}

pub fn page(id: &str, book_id: &str, page_number: u32) -> PersistedPage {
    PersistedPage { id: id.into(), book_id: book_id.into(), page_number, ..Default::default() }
}

#[async_trait]
impl PageApi for MockApi {
    async fn list_pages(&self, book_id: &str) -> Result<Vec<PersistedPage>, ApiError> {
        self.log(format!("list {book_id}"));
        if *self.fail_list.lock().unwrap() {
            return Err(ApiError::Request("connection refused".into()));
        }
        Ok(self
            .pages
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn create_page(&self, payload: &SavePayload) -> Result<PersistedPage, ApiError> {
        self.log(format!("create {}", payload.page_number));
        if *self.fail_create.lock().unwrap() {
            return Err(Self::server_error());
        }
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("new-{next}")
        };
        let record = record_from_payload(&id, payload);
        self.pages.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_page(&self, page_id: &str, payload: &SavePayload) -> Result<PersistedPage, ApiError> {
        self.log(format!("update {page_id}"));
        if self.failing_updates.lock().unwrap().iter().any(|id| id == page_id) {
            return Err(Self::server_error());
        }
        let record = record_from_payload(page_id, payload);
        let mut pages = self.pages.lock().unwrap();
        match pages.iter_mut().find(|p| p.id == page_id) {
            Some(existing) => *existing = record.clone(),
            None => return Err(ApiError::Response { status: 404, body: String::new() }),
        }
        Ok(record)
    }

    async fn delete_page(&self, page_id: &str) -> Result<(), ApiError> {
        self.log(format!("delete {page_id}"));
        self.pages.lock().unwrap().retain(|p| p.id != page_id);
        Ok(())
    }
}

#[async_trait]
impl UploadApi for MockApi {
    async fn upload(
        &self,
        kind: UploadKind,
        target: &UploadTarget,
        file: &LocalFile,
    ) -> Result<UploadedMedia, ApiError> {
        self.log(format!("upload {} {}", target.media_type, file.name));
        if self.failing_uploads.lock().unwrap().contains(&file.name) {
            return Err(Self::server_error());
        }
        Ok(UploadedMedia {
            url: format!("https://cdn.test/{}/{}", target.media_type, file.name),
            background_audio_url: (kind == UploadKind::Video).then(|| format!("https://cdn.test/audio/{}.mp3", file.name)),
        })
    }
}

#[async_trait]
impl EnhanceApi for MockApi {
    async fn enhance(&self, kind: EnhanceKind, text: &str) -> Result<String, ApiError> {
        self.log(format!("enhance {kind:?}"));
        Ok(match kind {
            EnhanceKind::Emotion => format!("[happy] {text}"),
            EnhanceKind::SoundEffect => format!("{text} [sfx: splash]"),
        })
    }

    async fn clear_cache(&self, book_id: &str) -> Result<ClearCacheResult, ApiError> {
        self.log(format!("clear-cache {book_id}"));
        Ok(ClearCacheResult { success: true, deleted_count: *self.deleted_count.lock().unwrap() })
    }
}

#[async_trait]
impl CatalogApi for MockApi {
    async fn games(&self) -> Result<Vec<Game>, ApiError> {
        Ok(self.games.lock().unwrap().clone())
    }

    async fn book(&self, book_id: &str) -> Result<Book, ApiError> {
        self.log(format!("book {book_id}"));
        Ok(self.book.lock().unwrap().clone())
    }
}

// =========================================================================
// Prompt
// =========================================================================

/// Answers every confirmation with a fixed reply and records the questions.
pub struct ScriptedPrompt {
    pub answer: bool,
    pub asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self { answer, asked: Mutex::new(Vec::new()) })
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, question: &str) -> bool {
        self.asked.lock().unwrap().push(question.to_owned());
        self.answer
    }
}

// =========================================================================
// Fixtures
// =========================================================================

pub fn previews() -> Arc<MemoryPreviews> {
    Arc::new(MemoryPreviews::new())
}

pub fn model(previews: &Arc<MemoryPreviews>) -> CanvasModel {
    let store: Arc<dyn PreviewStore> = previews.clone();
    CanvasModel::new(store)
}

pub fn png(name: &str) -> LocalFile {
    LocalFile::new(name, vec![0x89, b'P', b'N', b'G'])
}

pub fn mp4(name: &str) -> LocalFile {
    LocalFile::new(name, vec![0, 0, 0, 0x18, b'f', b't', b'y', b'p'])
}
