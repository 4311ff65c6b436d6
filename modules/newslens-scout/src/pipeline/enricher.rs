use std::sync::{Arc, LazyLock};

use ai_client::util::truncate_chars;
use ai_client::StructuredOutput;
use chrono::Utc;
use regex::Regex;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::{debug, info, warn};

use newslens_common::{
    clamp_score, AnalysisOrigin, Article, ArticleCore, Bias, BodyOrigin, EnrichmentFields, Source,
    Tone,
};

use crate::intelligence::{AnalysisRequest, ArticleAnalysis, Intelligence};
use crate::pipeline::outcome::UnitOutcome;
use crate::pipeline::scoring;
use crate::pipeline::text::{clean_labels, strip_html};
use crate::traits::ContentFetcher;
use crate::vocabulary::{local_officials, local_topics};

/// Factuality assumed when no analysis is available.
pub const FALLBACK_FACTUALITY: u8 = 70;

/// Body characters embedded in the analysis prompt.
pub const BODY_CHAR_BUDGET: usize = 4000;

/// A page must yield at least this many paragraphs to replace the feed summary.
pub const MIN_PARAGRAPHS: usize = 3;

/// ...and at least this many characters in total.
pub const MIN_BODY_CHARS: usize = 200;

/// Shorter blocks (bylines, captions, share links) do not count as paragraphs.
const MIN_PARAGRAPH_CHARS: usize = 40;

static P_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>").expect("valid regex"));

/// Paragraphs from Readability markdown: blank-line separated blocks that are
/// long enough and are not headings, images, or bare links.
pub fn paragraphs_from_markdown(markdown: &str) -> Vec<String> {
    markdown
        .split("\n\n")
        .map(|block| block.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|block| {
            block.chars().count() >= MIN_PARAGRAPH_CHARS
                && !block.starts_with('#')
                && !block.starts_with("![")
                && !(block.starts_with('[') && block.ends_with(')'))
        })
        .collect()
}

/// Paragraphs straight from `<p>` elements.
pub fn paragraphs_from_html(html: &str) -> Vec<String> {
    P_TAG_RE
        .captures_iter(html)
        .map(|cap| strip_html(&cap[1]))
        .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
        .collect()
}

fn sufficient(paragraphs: &[String]) -> bool {
    paragraphs.len() >= MIN_PARAGRAPHS
        && paragraphs.iter().map(|p| p.chars().count()).sum::<usize>() >= MIN_BODY_CHARS
}

fn readability_paragraphs(html: &str, url: &str) -> Vec<String> {
    let parsed_url = url::Url::parse(url).ok();
    let config = TransformConfig {
        readability: true,
        main_content: true,
        return_format: ReturnFormat::Markdown,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: parsed_url.as_ref(),
        content: html.as_bytes(),
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };
    paragraphs_from_markdown(&transform_content_input(input, &config))
}

/// Pick the analysis body: the page's main text when it has enough
/// paragraphs, otherwise the feed summary.
pub fn resolve_body(
    page_html: Option<&str>,
    url: &str,
    core: &ArticleCore,
) -> (String, BodyOrigin) {
    if let Some(html) = page_html {
        let mut paragraphs = readability_paragraphs(html, url);
        if !sufficient(&paragraphs) {
            paragraphs = paragraphs_from_html(html);
        }
        if sufficient(&paragraphs) {
            return (paragraphs.join("\n\n"), BodyOrigin::Page);
        }
        debug!(
            url,
            paragraphs = paragraphs.len(),
            "Page below paragraph threshold, using feed summary"
        );
    }

    let summary = if core.summary.trim().is_empty() {
        core.title.clone()
    } else {
        core.summary.clone()
    };
    (summary, BodyOrigin::FeedSummary)
}

pub fn build_analysis_prompt(title: &str, source_name: &str, body: &str) -> String {
    let schema = serde_json::to_string_pretty(&ArticleAnalysis::prompt_schema())
        .unwrap_or_default();
    format!(
        "Analyze this news article.\n\n\
         Identify manipulation techniques, key topics (short labels such as \"Federal Budget\"), \
         named public officials, a factuality score from 0 to 100, the emotional tone \
         (neutral, positive, negative, angry, fearful, hopeful), and the checkable claims it \
         makes, each with any supporting evidence cited and whether it is verifiable.\n\n\
         Title: {title}\n\
         Source: {source_name}\n\n\
         Article text:\n---\n{body}\n---\n\n\
         Respond with a single JSON object matching this schema:\n{schema}"
    )
}

/// Deterministic analysis used whenever the service cannot answer.
pub fn local_analysis(title: &str, body: &str) -> ArticleAnalysis {
    let text = format!("{title}\n{body}");
    ArticleAnalysis {
        manipulation_techniques: Vec::new(),
        key_topics: local_topics(&text),
        officials: local_officials(&text),
        factuality_score: FALLBACK_FACTUALITY as f64,
        emotional_tone: Tone::Neutral.as_str().to_string(),
        claims: Vec::new(),
        bias: None,
    }
}

/// Merge an analysis onto the bare article.
pub fn apply_analysis(
    core: ArticleCore,
    analysis: ArticleAnalysis,
    body: String,
    body_origin: BodyOrigin,
    analysis_origin: AnalysisOrigin,
) -> Article {
    let techniques = clean_labels(analysis.manipulation_techniques);
    let officials = clean_labels(analysis.officials);
    let tone = Tone::from_str_loose(&analysis.emotional_tone);
    let bias_override = analysis
        .bias
        .as_deref()
        .and_then(Bias::from_str_loose)
        .filter(|b| *b != core.source_bias);
    let impact_score = scoring::article_impact(
        officials.len(),
        techniques.len(),
        tone,
        core.source_credibility as f64,
    );

    Article {
        enrichment: Some(EnrichmentFields {
            techniques,
            topics: clean_labels(analysis.key_topics),
            officials,
            factuality: clamp_score(analysis.factuality_score),
            tone,
            claims: analysis
                .claims
                .into_iter()
                .filter(|c| !c.text.trim().is_empty())
                .collect(),
            bias_override,
            body,
            body_origin,
            analysis_origin,
            impact_score,
            analyzed_at: Utc::now(),
        }),
        core,
    }
}

/// Attaches analysis to bare articles. Never fails: the worst case is the
/// local fallback over the feed summary.
pub struct Enricher {
    fetcher: Arc<dyn ContentFetcher>,
    intelligence: Arc<dyn Intelligence>,
}

impl Enricher {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, intelligence: Arc<dyn Intelligence>) -> Self {
        Self {
            fetcher,
            intelligence,
        }
    }

    pub async fn enrich(&self, article: Article, source: &Source) -> UnitOutcome<Article> {
        let core = article.core;

        let page = match self.fetcher.page(&core.url).await {
            Ok(page) => page,
            Err(e) => {
                debug!(
                    url = %core.url,
                    error = %e,
                    "Page fetch failed, falling back to feed summary"
                );
                None
            }
        };
        let (body, body_origin) = resolve_body(page.as_deref(), &core.url, &core);

        let excerpt = truncate_chars(&body, BODY_CHAR_BUDGET).to_string();
        let request = AnalysisRequest {
            prompt: build_analysis_prompt(&core.title, &source.name, &excerpt),
            title: core.title.clone(),
            source_name: source.name.clone(),
            body: excerpt,
        };

        match self.intelligence.analyze_article(&request).await {
            Ok(analysis) => {
                let enriched =
                    apply_analysis(core, analysis, body, body_origin, AnalysisOrigin::Service);
                info!(
                    url = enriched.url(),
                    provider = self.intelligence.name(),
                    body = body_origin.as_str(),
                    topics = enriched.topics().len(),
                    "Article enriched"
                );
                UnitOutcome::Success(enriched)
            }
            Err(e) => {
                warn!(url = %core.url, error = %e, "Analysis unavailable, using local extractor");
                let analysis = local_analysis(&core.title, &body);
                let enriched = apply_analysis(
                    core,
                    analysis,
                    body,
                    body_origin,
                    AnalysisOrigin::LocalFallback,
                );
                UnitOutcome::degraded(enriched, format!("analysis unavailable: {e}"))
            }
        }
    }
}
