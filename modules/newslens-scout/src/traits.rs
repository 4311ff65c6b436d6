// Trait abstractions for the scout's external dependencies.
//
// ContentFetcher covers every plain HTTP GET (feeds and article pages).
// NewsStore covers the two upserts the pipeline is allowed to make.
//
// Both have in-memory doubles in `testing` so the whole cycle runs without
// network or database.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use newslens_common::{Article, Comparison, NewsLensError};

// ---------------------------------------------------------------------------
// ContentFetcher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch a feed document. `Ok(None)` means the server answered non-2xx.
    async fn feed(&self, url: &str) -> Result<Option<Vec<u8>>, NewsLensError>;

    /// Fetch an article page as HTML. `Ok(None)` means the server answered non-2xx.
    async fn page(&self, url: &str) -> Result<Option<String>, NewsLensError>;
}

/// reqwest-backed fetcher with a descriptive user agent and a hard timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build feed HTTP client")?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<Option<reqwest::Response>, NewsLensError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(url, e))?;

        if !resp.status().is_success() {
            debug!(url, status = resp.status().as_u16(), "Non-success status, treating as no data");
            return Ok(None);
        }
        Ok(Some(resp))
    }
}

fn transport(url: &str, e: reqwest::Error) -> NewsLensError {
    NewsLensError::Transport(format!("GET {url} failed: {e}"))
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn feed(&self, url: &str) -> Result<Option<Vec<u8>>, NewsLensError> {
        match self.get(url).await? {
            Some(resp) => {
                let bytes = resp.bytes().await.map_err(|e| transport(url, e))?;
                Ok(Some(bytes.to_vec()))
            }
            None => Ok(None),
        }
    }

    async fn page(&self, url: &str) -> Result<Option<String>, NewsLensError> {
        match self.get(url).await? {
            Some(resp) => Ok(Some(resp.text().await.map_err(|e| transport(url, e))?)),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// NewsStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Insert or refresh an article keyed by URL.
    ///
    /// On conflict the enrichment fields and analysis timestamp are replaced;
    /// title, source, and publish timestamp keep their first-seen values.
    async fn upsert_article(&self, article: &Article) -> Result<(), NewsLensError>;

    /// Insert or refresh a comparison keyed by topic.
    ///
    /// On conflict only consensus level, factual accuracy, and the analysis
    /// timestamp are replaced.
    async fn upsert_comparison(&self, comparison: &Comparison) -> Result<(), NewsLensError>;
}
