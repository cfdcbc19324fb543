//! `reqwest` implementation of every backend collaborator.
//!
//! Thin HTTP wrapper: build the request, check the status, decode the body.
//! Body decoding lives in `parse_body` for testability.

use std::time::Duration;

use async_trait::async_trait;
use canvas::media::LocalFile;
use canvas::payload::SavePayload;
use canvas::persisted::PersistedPage;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::{
    ApiError, Book, CLEAR_CACHE_ENDPOINT, CatalogApi, ClearCacheResult, EnhanceApi, EnhanceKind, EnhancedText,
    GAMES_ENDPOINT, Game, PAGES_ENDPOINT, PageApi, UploadApi, UploadKind, UploadTarget, UploadedMedia,
    book_endpoint, book_pages_endpoint, enhance_endpoint, page_endpoint, upload_endpoint, upload_query,
};
use crate::config::EditorConfig;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    /// Build a client with the configured timeouts and optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &EditorConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.api_url.clone(), token: config.api_token.clone() })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_text(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Response { status: status.as_u16(), body: text });
        }
        Ok(text)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let text = self.send_text(builder).await?;
        parse_body(&text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

fn file_part(file: &LocalFile) -> Result<Part, ApiError> {
    Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(&file.content_type)
        .map_err(|e| ApiError::Request(format!("invalid content type for {}: {e}", file.name)))
}

// =============================================================================
// COLLABORATORS
// =============================================================================

#[async_trait]
impl PageApi for HttpApi {
    async fn list_pages(&self, book_id: &str) -> Result<Vec<PersistedPage>, ApiError> {
        self.send(self.request(Method::GET, &book_pages_endpoint(book_id)))
            .await
    }

    async fn create_page(&self, payload: &SavePayload) -> Result<PersistedPage, ApiError> {
        self.send(self.request(Method::POST, PAGES_ENDPOINT).json(payload))
            .await
    }

    async fn update_page(&self, page_id: &str, payload: &SavePayload) -> Result<PersistedPage, ApiError> {
        self.send(self.request(Method::PUT, &page_endpoint(page_id)).json(payload))
            .await
    }

    async fn delete_page(&self, page_id: &str) -> Result<(), ApiError> {
        self.send_text(self.request(Method::DELETE, &page_endpoint(page_id)))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl UploadApi for HttpApi {
    async fn upload(
        &self,
        kind: UploadKind,
        target: &UploadTarget,
        file: &LocalFile,
    ) -> Result<UploadedMedia, ApiError> {
        debug!(file = %file.name, bytes = file.bytes.len(), media_type = %target.media_type, "uploading");
        let form = Form::new().part("file", file_part(file)?);
        let builder = self
            .request(Method::POST, upload_endpoint(kind))
            .query(&upload_query(kind, target))
            .multipart(form);
        self.send(builder).await
    }
}

#[async_trait]
impl EnhanceApi for HttpApi {
    async fn enhance(&self, kind: EnhanceKind, text: &str) -> Result<String, ApiError> {
        let body = json!({ "text": text });
        let enhanced: EnhancedText = self
            .send(self.request(Method::POST, enhance_endpoint(kind)).json(&body))
            .await?;
        Ok(enhanced.enhanced_text)
    }

    async fn clear_cache(&self, book_id: &str) -> Result<ClearCacheResult, ApiError> {
        let body = json!({ "bookId": book_id });
        self.send(self.request(Method::DELETE, CLEAR_CACHE_ENDPOINT).json(&body))
            .await
    }
}

#[async_trait]
impl CatalogApi for HttpApi {
    async fn games(&self) -> Result<Vec<Game>, ApiError> {
        self.send(self.request(Method::GET, GAMES_ENDPOINT)).await
    }

    async fn book(&self, book_id: &str) -> Result<Book, ApiError> {
        self.send(self.request(Method::GET, &book_endpoint(book_id)))
            .await
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
