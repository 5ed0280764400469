//! Content API client — loads and saves page documents on the hosting app.
//!
//! DESIGN
//! ======
//! The hosting application owns persistence; this service only speaks its
//! HTTP API. [`ContentApi`] wraps one `reqwest::Client` (built once, with
//! request and connect timeouts) plus the base URL and optional bearer token,
//! and is shared by the page store, the link selector and the uploader.
//! [`PageStore`] is the seam sessions depend on so tests can swap in an
//! in-memory store.
//!
//! ERROR HANDLING
//! ==============
//! Any non-2xx response is a `StoreError::Response` carrying the status and
//! body text. Transport errors and 5xx responses are retryable; the save
//! coordinator retries whatever it gets, the flag is for API clients.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::config::{Config, HttpTimeouts};
use crate::content::PageContent;
use crate::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("content API request failed: {0}")]
    Request(String),
    #[error("content API responded with status {status}")]
    Response { status: u16, body: String },
    #[error("content API response parse failed: {0}")]
    Parse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_STORE_REQUEST",
            Self::Response { status: 404, .. } => "E_PAGE_NOT_FOUND",
            Self::Response { .. } => "E_STORE_RESPONSE",
            Self::Parse(_) => "E_STORE_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Response { status, .. } => *status >= 500 || *status == 429,
            Self::Parse(_) | Self::HttpClientBuild(_) => false,
        }
    }
}

impl StoreError {
    /// `true` when the API answered 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Response { status: 404, .. })
    }
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// Build the shared HTTP client with the configured timeouts.
///
/// # Errors
///
/// Returns `HttpClientBuild` if the TLS backend cannot be initialized.
pub fn build_http_client(timeouts: HttpTimeouts) -> Result<reqwest::Client, StoreError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| StoreError::HttpClientBuild(e.to_string()))
}

/// Authenticated client for the hosting application's content API.
#[derive(Clone)]
pub struct ContentApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ContentApi {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http, base_url, token }
    }

    /// # Errors
    ///
    /// Returns `HttpClientBuild` if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let http = build_http_client(config.http)?;
        Ok(Self::new(http, config.content_api_url.clone(), config.content_api_token.clone()))
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The bare HTTP client, for requests outside the content API (presigned uploads).
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let text = self.send(self.authed(self.http.get(self.url(path)))).await?;
        serde_json::from_str(&text).map_err(|e| StoreError::Parse(e.to_string()))
    }

    pub(crate) async fn put_json(&self, path: &str, body: &impl Serialize) -> Result<String, StoreError> {
        self.send(self.authed(self.http.put(self.url(path))).json(body))
            .await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T, StoreError> {
        let text = self
            .send(self.authed(self.http.post(self.url(path))).json(body))
            .await?;
        serde_json::from_str(&text).map_err(|e| StoreError::Parse(e.to_string()))
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(StoreError::Response { status: status.as_u16(), body: text });
        }
        Ok(text)
    }
}

// =============================================================================
// PAGE STORE
// =============================================================================

/// Where page documents are loaded from and saved to.
#[async_trait::async_trait]
pub trait PageStore: Send + Sync {
    async fn load(&self, page_id: Uuid) -> Result<PageContent, StoreError>;
    async fn save(&self, page_id: Uuid, content: &PageContent) -> Result<(), StoreError>;
}

/// `GET`/`PUT {CONTENT_API_URL}/api/pages/{id}/content`.
pub struct HttpPageStore {
    api: ContentApi,
}

impl HttpPageStore {
    #[must_use]
    pub fn new(api: ContentApi) -> Self {
        Self { api }
    }
}

fn content_path(page_id: Uuid) -> String {
    format!("/api/pages/{page_id}/content")
}

#[async_trait::async_trait]
impl PageStore for HttpPageStore {
    async fn load(&self, page_id: Uuid) -> Result<PageContent, StoreError> {
        self.api.get_json(&content_path(page_id)).await
    }

    async fn save(&self, page_id: Uuid, content: &PageContent) -> Result<(), StoreError> {
        self.api
            .put_json(&content_path(page_id), content)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str, token: Option<&str>) -> ContentApi {
        ContentApi::new(reqwest::Client::new(), base, token.map(str::to_owned))
    }

    #[test]
    fn url_joins_without_double_slash() {
        let api = api("https://cms.test/", None);
        assert_eq!(api.url("/api/pages"), "https://cms.test/api/pages");
    }

    #[test]
    fn content_path_uses_page_id() {
        let id = Uuid::nil();
        assert_eq!(content_path(id), "/api/pages/00000000-0000-0000-0000-000000000000/content");
    }

    #[test]
    fn authed_adds_bearer_token_when_configured() {
        let with = api("https://cms.test", Some("tok"));
        let request = with
            .authed(with.http.get(with.url("/x")))
            .build()
            .unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer tok");

        let without = api("https://cms.test", None);
        let request = without
            .authed(without.http.get(without.url("/x")))
            .build()
            .unwrap();
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn error_codes_and_retryable() {
        let not_found = StoreError::Response { status: 404, body: String::new() };
        assert_eq!(not_found.error_code(), "E_PAGE_NOT_FOUND");
        assert!(not_found.is_not_found());
        assert!(!not_found.retryable());

        let unavailable = StoreError::Response { status: 503, body: String::new() };
        assert_eq!(unavailable.error_code(), "E_STORE_RESPONSE");
        assert!(unavailable.retryable());

        assert!(StoreError::Request("reset".into()).retryable());
        assert!(!StoreError::Parse("eof".into()).retryable());
    }

    #[tokio::test]
    async fn unreachable_host_is_request_error() {
        let http = build_http_client(HttpTimeouts { request_secs: 1, connect_secs: 1 }).unwrap();
        let store = HttpPageStore::new(ContentApi::new(http, "http://127.0.0.1:1", None));
        let err = store.load(Uuid::nil()).await.unwrap_err();
        assert!(matches!(err, StoreError::Request(_)));
    }
}
