//! Backend collaborators: page storage, media upload, text enhancement, and
//! catalog lookups.
//!
//! DESIGN
//! ======
//! Each collaborator is an async trait so the editor logic can run against
//! in-memory fakes. [`http::HttpApi`] implements all four against the admin
//! backend. Endpoint paths are built by the small functions below so they
//! can be checked without a server.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns [`ApiError`]. Non-2xx responses keep the raw body so
//! user-facing messages can include the server's own explanation via
//! [`ApiError::detail`].

pub mod http;


use async_trait::async_trait;
use canvas::media::LocalFile;
use canvas::mention::CharacterVoice;
use canvas::payload::SavePayload;
use canvas::persisted::PersistedPage;
use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never got a response.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend returned a non-success status.
    #[error("server returned status {status}")]
    Response { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Human-readable detail, preferring the server's `message` or `error`
    /// field when the body is JSON.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Response { status, body } => {
                server_message(body).unwrap_or_else(|| {
                    let body = body.trim();
                    if body.is_empty() { format!("status {status}") } else { format!("status {status}: {body}") }
                })
            }
            other => other.to_string(),
        }
    }

    /// Whether retrying the same request could succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { status: 429 | 500..=599, .. })
    }
}

fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_owned)
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Which upload endpoint a file goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Video,
    SoundEffect,
}

/// Where an uploaded file belongs: book, page, and the `type` tag the
/// backend files it under (`background`, `scroll`, `video-sequence`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub book_id: String,
    pub media_type: String,
    pub page_number: u32,
}

/// Upload response. Video uploads may carry an extracted audio track.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_audio_url: Option<String>,
}

/// Which prompt markup the enhancement service adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhanceKind {
    Emotion,
    SoundEffect,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedText {
    pub enhanced_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCacheResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub deleted_count: u64,
}

/// A catalog game. Only `webview` games with a URL can back a web-view page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Game {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    pub game_type: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub character_voices: Vec<CharacterVoice>,
}

// =============================================================================
// COLLABORATOR TRAITS
// =============================================================================

#[async_trait]
pub trait PageApi: Send + Sync {
    async fn list_pages(&self, book_id: &str) -> Result<Vec<PersistedPage>, ApiError>;
    async fn create_page(&self, payload: &SavePayload) -> Result<PersistedPage, ApiError>;
    async fn update_page(&self, page_id: &str, payload: &SavePayload) -> Result<PersistedPage, ApiError>;
    async fn delete_page(&self, page_id: &str) -> Result<(), ApiError>;
}

#[async_trait]
pub trait UploadApi: Send + Sync {
    async fn upload(
        &self,
        kind: UploadKind,
        target: &UploadTarget,
        file: &LocalFile,
    ) -> Result<UploadedMedia, ApiError>;
}

#[async_trait]
pub trait EnhanceApi: Send + Sync {
    async fn enhance(&self, kind: EnhanceKind, text: &str) -> Result<String, ApiError>;
    async fn clear_cache(&self, book_id: &str) -> Result<ClearCacheResult, ApiError>;
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn games(&self) -> Result<Vec<Game>, ApiError>;
    async fn book(&self, book_id: &str) -> Result<Book, ApiError>;
}

// =============================================================================
// ENDPOINTS
// =============================================================================

pub(crate) const PAGES_ENDPOINT: &str = "/api/pages";
pub(crate) const GAMES_ENDPOINT: &str = "/api/games";
pub(crate) const CLEAR_CACHE_ENDPOINT: &str = "/api/tts/clear-cache";

pub(crate) fn book_pages_endpoint(book_id: &str) -> String {
    format!("/api/pages/book/{book_id}")
}

pub(crate) fn page_endpoint(page_id: &str) -> String {
    format!("/api/pages/{page_id}")
}

pub(crate) fn book_endpoint(book_id: &str) -> String {
    format!("/api/books/{book_id}")
}

pub(crate) fn upload_endpoint(kind: UploadKind) -> &'static str {
    match kind {
        UploadKind::Image => "/api/upload/image",
        UploadKind::Video => "/api/upload/video",
        UploadKind::SoundEffect => "/api/upload/sound-effect",
    }
}

/// Query parameters for an upload. Sound effects carry no `type`.
pub(crate) fn upload_query(kind: UploadKind, target: &UploadTarget) -> Vec<(&'static str, String)> {
    let mut query = vec![("bookId", target.book_id.clone())];
    if kind != UploadKind::SoundEffect {
        query.push(("type", target.media_type.clone()));
    }
    query.push(("pageNumber", target.page_number.to_string()));
    query
}

pub(crate) fn enhance_endpoint(kind: EnhanceKind) -> &'static str {
    match kind {
        EnhanceKind::Emotion => "/api/tts/enhance",
        EnhanceKind::SoundEffect => "/api/tts/enhance-sfx",
    }
}
