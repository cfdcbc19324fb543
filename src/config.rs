//! Editor configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TEMPLATE_PATH: &str = "page-templates.json";

/// Errors produced while building an [`EditorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API base URL is not an http(s) URL.
    #[error("invalid API base URL '{0}': expected http:// or https://")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    pub api_token: Option<String>,
    pub timeouts: Timeouts,
    /// JSON file backing the durable template store.
    pub template_path: PathBuf,
}

impl EditorConfig {
    /// Build a validated config from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `api_url` is not http(s).
    pub fn new(
        api_url: &str,
        api_token: Option<String>,
        timeouts: Timeouts,
        template_path: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_base_url(api_url)?,
            api_token: api_token.filter(|t| !t.trim().is_empty()),
            timeouts,
            template_path: template_path.into(),
        })
    }

    /// Build typed editor config from environment variables.
    ///
    /// Optional:
    /// - `PAGE_EDITOR_API_URL`: default `http://127.0.0.1:5000`
    /// - `PAGE_EDITOR_API_TOKEN`: bearer token, unset for none
    /// - `PAGE_EDITOR_REQUEST_TIMEOUT_SECS`: default 120
    /// - `PAGE_EDITOR_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PAGE_EDITOR_TEMPLATE_PATH`: default `page-templates.json`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the API URL is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("PAGE_EDITOR_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_token = std::env::var("PAGE_EDITOR_API_TOKEN").ok();
        let timeouts = Timeouts {
            request_secs: env_parse_u64("PAGE_EDITOR_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("PAGE_EDITOR_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let template_path =
            std::env::var("PAGE_EDITOR_TEMPLATE_PATH").unwrap_or_else(|_| DEFAULT_TEMPLATE_PATH.to_string());

        Self::new(&api_url, api_token, timeouts, template_path)
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_string()))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
