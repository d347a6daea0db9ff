//! The outbound HTTP edge of the scraper.
//!
//! [`PageFetcher`] is the seam tests substitute; [`HttpFetcher`] is the real
//! reqwest-backed implementation. One GET per fetch, no retries: transient
//! upstream failures are the caller's problem to surface, not ours to paper
//! over.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("client build failed: {0}")]
    Build(String),
    #[error("request failed: {0}")]
    Network(String),
    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("body read failed: {0}")]
    Read(String),
}

/// A successfully fetched page: the declared content type plus body text.
///
/// The content-type gate lives in the extractor so it applies uniformly to
/// every [`PageFetcher`] implementation.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub content_type: Option<String>,
    pub body: String,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// reqwest-backed fetcher with a fixed user agent and total timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Build(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let started = Instant::now();
        tracing::debug!(url = %url, "fetch.start");

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = %status, "fetch.bad_status");
            return Err(FetchError::Status(status));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Read(e.to_string()))?;

        tracing::debug!(
            url = %url,
            status = %status,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetch.done"
        );
        Ok(FetchedPage { content_type, body })
    }
}
