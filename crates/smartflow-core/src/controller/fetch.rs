use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Page navigation; served network-first.
    Navigate,
    /// Any other resource; served cache-first.
    Resource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Absolute URL or a path relative to the controller origin.
    pub url: String,
    pub mode: RequestMode,
}

impl FetchRequest {
    pub fn resource(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Resource,
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Navigate,
        }
    }
}

/// A fully buffered response, as kept in the asset cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Network access used by the controller.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<CachedResponse, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<CachedResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?
            .to_vec();

        Ok(CachedResponse {
            url: url.to_string(),
            status,
            content_type,
            body,
        })
    }
}
