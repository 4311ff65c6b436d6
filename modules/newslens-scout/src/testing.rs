// Test doubles for the scout pipeline.
//
// One per trait boundary:
// - MockFetcher (ContentFetcher): URL -> body / status map
// - MockIntelligence (Intelligence): scripted answers, outage switches, call counters
// - MemoryStore (NewsStore): in-memory tables with the real upsert semantics
//
// Plus helpers for building sources and RSS documents.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use newslens_common::{Article, Bias, Comparison, NewsLensError, Source, SourceCategory};

use crate::intelligence::{
    AnalysisRequest, ArticleAnalysis, ComparisonRequest, CoverageVerdict, HeuristicIntelligence,
    Intelligence,
};
use crate::traits::{ContentFetcher, NewsStore};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum MockResponse {
    Body(String),
    Status(u16),
}

/// URL-keyed fetcher. Unregistered URLs fail like an unreachable host.
#[derive(Default)]
pub struct MockFetcher {
    feeds: HashMap<String, MockResponse>,
    pages: HashMap<String, MockResponse>,
    feed_requests: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_feed(mut self, url: &str, body: impl Into<String>) -> Self {
        self.feeds.insert(url.to_string(), MockResponse::Body(body.into()));
        self
    }

    pub fn on_feed_status(mut self, url: &str, status: u16) -> Self {
        self.feeds.insert(url.to_string(), MockResponse::Status(status));
        self
    }

    pub fn on_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), MockResponse::Body(html.into()));
        self
    }

    pub fn feed_requests(&self) -> usize {
        self.feed_requests.load(Ordering::SeqCst)
    }

    fn respond(
        map: &HashMap<String, MockResponse>,
        url: &str,
    ) -> Result<Option<String>, NewsLensError> {
        match map.get(url) {
            Some(MockResponse::Body(body)) => Ok(Some(body.clone())),
            Some(MockResponse::Status(status)) if (200..300).contains(status) => {
                Ok(Some(String::new()))
            }
            Some(MockResponse::Status(_)) => Ok(None),
            None => Err(NewsLensError::Transport(format!(
                "MockFetcher: nothing registered for {url}"
            ))),
        }
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn feed(&self, url: &str) -> Result<Option<Vec<u8>>, NewsLensError> {
        self.feed_requests.fetch_add(1, Ordering::SeqCst);
        Ok(Self::respond(&self.feeds, url)?.map(String::into_bytes))
    }

    async fn page(&self, url: &str) -> Result<Option<String>, NewsLensError> {
        Self::respond(&self.pages, url)
    }
}

// ---------------------------------------------------------------------------
// MockIntelligence
// ---------------------------------------------------------------------------

/// Scripted intelligence. Titles without a scripted analysis, and comparisons
/// without a scripted verdict, get the heuristic provider's answer.
#[derive(Default)]
pub struct MockIntelligence {
    analyses: HashMap<String, ArticleAnalysis>,
    verdict: Option<CoverageVerdict>,
    analysis_outage: bool,
    comparison_outage: bool,
    analyze_calls: AtomicUsize,
    compare_calls: AtomicUsize,
    compared_topics: Mutex<Vec<String>>,
    heuristic: HeuristicIntelligence,
}

impl MockIntelligence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the service were down.
    pub fn unavailable() -> Self {
        Self {
            analysis_outage: true,
            comparison_outage: true,
            ..Self::default()
        }
    }

    pub fn with_analysis(mut self, title: &str, analysis: ArticleAnalysis) -> Self {
        self.analyses.insert(title.to_string(), analysis);
        self
    }

    pub fn with_verdict(mut self, verdict: CoverageVerdict) -> Self {
        self.verdict = Some(verdict);
        self
    }

    pub fn failing_comparisons(mut self) -> Self {
        self.comparison_outage = true;
        self
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn compare_calls(&self) -> usize {
        self.compare_calls.load(Ordering::SeqCst)
    }

    pub fn compared_topics(&self) -> Vec<String> {
        self.compared_topics.lock().unwrap().clone()
    }
}

#[async_trait]
impl Intelligence for MockIntelligence {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze_article(
        &self,
        request: &AnalysisRequest,
    ) -> Result<ArticleAnalysis, NewsLensError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        if self.analysis_outage {
            return Err(NewsLensError::Intelligence("simulated outage".into()));
        }
        match self.analyses.get(&request.title) {
            Some(analysis) => Ok(analysis.clone()),
            None => self.heuristic.analyze_article(request).await,
        }
    }

    async fn compare_coverage(
        &self,
        request: &ComparisonRequest,
    ) -> Result<CoverageVerdict, NewsLensError> {
        self.compare_calls.fetch_add(1, Ordering::SeqCst);
        self.compared_topics.lock().unwrap().push(request.topic.clone());
        if self.comparison_outage {
            return Err(NewsLensError::Intelligence("simulated outage".into()));
        }
        match &self.verdict {
            Some(verdict) => Ok(verdict.clone()),
            None => self.heuristic.compare_coverage(request).await,
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory tables keyed like the Postgres ones, with the same conflict rules.
#[derive(Default)]
pub struct MemoryStore {
    articles: Mutex<HashMap<String, Article>>,
    comparisons: Mutex<HashMap<String, Comparison>>,
    reject_articles: bool,
    reject_comparisons: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write is rejected.
    pub fn rejecting() -> Self {
        Self {
            reject_articles: true,
            reject_comparisons: true,
            ..Self::default()
        }
    }

    pub fn article(&self, url: &str) -> Option<Article> {
        self.articles.lock().unwrap().get(url).cloned()
    }

    pub fn articles(&self) -> Vec<Article> {
        let mut all: Vec<Article> = self.articles.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.core.url.cmp(&b.core.url));
        all
    }

    pub fn comparison(&self, topic: &str) -> Option<Comparison> {
        self.comparisons.lock().unwrap().get(topic).cloned()
    }

    pub fn comparisons(&self) -> Vec<Comparison> {
        let mut all: Vec<Comparison> =
            self.comparisons.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.topic.cmp(&b.topic));
        all
    }
}

#[async_trait]
impl NewsStore for MemoryStore {
    async fn upsert_article(&self, article: &Article) -> Result<(), NewsLensError> {
        if self.reject_articles {
            return Err(NewsLensError::Persistence(
                "MemoryStore: article write rejected".into(),
            ));
        }
        let mut articles = self.articles.lock().unwrap();
        match articles.get_mut(&article.core.url) {
            Some(existing) => existing.enrichment = article.enrichment.clone(),
            None => {
                articles.insert(article.core.url.clone(), article.clone());
            }
        }
        Ok(())
    }

    async fn upsert_comparison(&self, comparison: &Comparison) -> Result<(), NewsLensError> {
        if self.reject_comparisons {
            return Err(NewsLensError::Persistence(
                "MemoryStore: comparison write rejected".into(),
            ));
        }
        let mut comparisons = self.comparisons.lock().unwrap();
        match comparisons.get_mut(&comparison.topic) {
            Some(existing) => {
                existing.consensus_level = comparison.consensus_level;
                existing.factual_accuracy = comparison.factual_accuracy;
                existing.analyzed_at = comparison.analyzed_at;
            }
            None => {
                comparisons.insert(comparison.topic.clone(), comparison.clone());
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A mainstream source whose feed lives at `https://<slug>.example/feed`.
pub fn test_source(name: &str, bias: Bias, credibility: u8) -> Source {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    Source {
        name: name.to_string(),
        home_url: format!("https://{slug}.example"),
        feed_url: format!("https://{slug}.example/feed"),
        bias,
        credibility,
        category: SourceCategory::Mainstream,
    }
}

/// One `<item>`: title, link, description, RFC 2822 date (empty for none).
pub type RssItem<'a> = (&'a str, &'a str, &'a str, &'a str);

pub fn rss_feed(items: &[RssItem<'_>]) -> String {
    let body: String = items
        .iter()
        .map(|(title, link, description, date)| {
            let date = if date.is_empty() {
                String::new()
            } else {
                format!("<pubDate>{date}</pubDate>")
            };
            format!(
                "<item><title>{title}</title><link>{link}</link>\
                 <description>{description}</description>{date}</item>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Test feed</title><link>https://feed.example</link><description>t</description>{body}</channel></rss>"#
    )
}
