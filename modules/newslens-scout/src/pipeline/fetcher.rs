use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use newslens_common::{Article, ArticleCore, NewsLensError, Source};

use crate::pipeline::outcome::UnitOutcome;
use crate::pipeline::text::strip_html;
use crate::traits::ContentFetcher;
use crate::vocabulary::{mentions_any, POLITICAL_TERMS};

/// Most recent entries considered per source per run.
pub const FEED_MAX_ITEMS: usize = 10;

/// Titles synthesized from a summary are cut to this many characters.
const DERIVED_TITLE_CHARS: usize = 120;

/// A single entry extracted from an RSS/Atom/JSON feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Parse a feed document, newest first.
///
/// Entries without a resolvable link are dropped since the URL is the
/// article's identity. A missing title is derived from the summary; an entry
/// with neither is dropped.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>, NewsLensError> {
    let feed = feed_rs::parser::parse(bytes)
        .map_err(|e| NewsLensError::Parse(format!("Failed to parse RSS/Atom feed: {e}")))?;

    let mut entries: Vec<FeedEntry> = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let url = entry
                .links
                .first()
                .map(|l| l.href.trim().to_string())
                .filter(|href| href.starts_with("http"))
                .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))?;

            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .map(|s| strip_html(&s))
                .unwrap_or_default();

            let title = entry
                .title
                .map(|t| strip_html(&t.content))
                .filter(|t| !t.is_empty())
                .or_else(|| derive_title(&summary))?;

            Some(FeedEntry {
                url,
                title,
                summary,
                published_at: entry.published.or(entry.updated),
            })
        })
        .collect();

    // Sort by date descending (entries without dates go last)
    entries.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    Ok(entries)
}

fn derive_title(summary: &str) -> Option<String> {
    let first_sentence = summary.split(". ").next()?.trim();
    if first_sentence.is_empty() {
        return None;
    }
    Some(first_sentence.chars().take(DERIVED_TITLE_CHARS).collect())
}

/// Civic/political relevance: any fixed vocabulary term in title or summary.
pub fn is_politically_relevant(title: &str, summary: &str) -> bool {
    mentions_any(title, POLITICAL_TERMS) || mentions_any(summary, POLITICAL_TERMS)
}

/// Cap to the most recent entries, keep relevant ones, and turn them into bare articles.
pub fn entries_to_articles(entries: Vec<FeedEntry>, source: &Source) -> Vec<Article> {
    entries
        .into_iter()
        .take(FEED_MAX_ITEMS)
        .filter(|e| is_politically_relevant(&e.title, &e.summary))
        .map(|e| {
            Article::bare(ArticleCore {
                url: e.url,
                title: e.title,
                source_name: source.name.clone(),
                summary: e.summary,
                published_at: e.published_at,
                source_bias: source.bias,
                source_credibility: source.credibility,
            })
        })
        .collect()
}

/// Retrieves one source's feed and yields its relevant, bare articles.
pub struct SourceFetcher {
    fetcher: Arc<dyn ContentFetcher>,
}

impl SourceFetcher {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Transport and parse failures come back as `Failed` with no articles;
    /// they never abort the run.
    pub async fn fetch_source(&self, source: &Source) -> UnitOutcome<Vec<Article>> {
        let bytes = match self.fetcher.feed(&source.feed_url).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(
                    source = %source.name,
                    feed = %source.feed_url,
                    "Feed returned non-success status"
                );
                return UnitOutcome::failed("feed returned non-success status");
            }
            Err(e) => {
                debug!(source = %source.name, error = %e, "Feed fetch failed");
                return UnitOutcome::failed(e.to_string());
            }
        };

        let entries = match parse_feed(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(source = %source.name, error = %e, "Feed parse failed");
                return UnitOutcome::failed(e.to_string());
            }
        };

        let total = entries.len();
        let articles = entries_to_articles(entries, source);
        info!(
            source = %source.name,
            entries = total,
            relevant = articles.len(),
            "Parsed feed"
        );
        UnitOutcome::Success(articles)
    }
}
