use std::sync::Arc;

use ai_client::util::truncate_chars;
use ai_client::StructuredOutput;
use chrono::Utc;
use tracing::{info, warn};

use newslens_common::{clamp_score, Bias, BiasDistribution, ClusterScores, Comparison, Tone};

use crate::intelligence::{
    ComparisonRequest, CoverageExcerpt, CoverageVerdict, Intelligence, ReportedBiasDistribution,
};
use crate::pipeline::clusterer::TopicCluster;
use crate::pipeline::enricher::FALLBACK_FACTUALITY;
use crate::pipeline::text::clean_labels;

/// Body characters per article in the comparison prompt.
pub const EXCERPT_CHAR_BUDGET: usize = 1200;

/// Normalized verdict for one cluster, every score on 0..=100.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSourceVerdict {
    pub sources: Vec<String>,
    pub consensus_level: u8,
    pub discrepancies: Vec<String>,
    pub propaganda_patterns: Vec<String>,
    pub factual_accuracy: u8,
    pub bias_distribution: BiasDistribution,
    pub manipulation_assessment: String,
    pub public_impact: String,
}

impl CrossSourceVerdict {
    pub fn into_comparison(self, cluster: &TopicCluster, scores: ClusterScores) -> Comparison {
        Comparison {
            topic: cluster.topic.clone(),
            sources: self.sources,
            consensus_level: self.consensus_level,
            discrepancies: self.discrepancies,
            propaganda_patterns: self.propaganda_patterns,
            factual_accuracy: self.factual_accuracy,
            bias_distribution: self.bias_distribution,
            manipulation_assessment: self.manipulation_assessment,
            public_impact: self.public_impact,
            article_count: cluster.articles.len(),
            scores,
            analyzed_at: Utc::now(),
        }
    }
}

#[derive(Debug)]
pub enum ComparisonOutcome {
    Compared(CrossSourceVerdict),
    /// Fewer than two distinct sources; nothing to cross-check.
    SingleSource,
    /// The service failed; the topic is dropped for this run.
    Abandoned { reason: String },
}

pub fn excerpts(cluster: &TopicCluster) -> Vec<CoverageExcerpt> {
    cluster
        .articles
        .iter()
        .map(|a| {
            let e = a.enrichment.as_ref();
            CoverageExcerpt {
                source_name: a.core.source_name.clone(),
                title: a.core.title.clone(),
                bias: a.bias(),
                body: truncate_chars(a.body(), EXCERPT_CHAR_BUDGET).to_string(),
                tone: e.map(|e| e.tone).unwrap_or(Tone::Neutral),
                factuality: e.map(|e| e.factuality).unwrap_or(FALLBACK_FACTUALITY),
                techniques: e.map(|e| e.techniques.clone()).unwrap_or_default(),
            }
        })
        .collect()
}

pub fn build_comparison_prompt(topic: &str, excerpts: &[CoverageExcerpt]) -> String {
    let schema =
        serde_json::to_string_pretty(&CoverageVerdict::prompt_schema()).unwrap_or_default();
    let articles: String = excerpts
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "### Article {n}\nSource: {source} (bias: {bias})\nTitle: {title}\n\n{body}\n\n",
                n = i + 1,
                source = e.source_name,
                bias = e.bias,
                title = e.title,
                body = e.body,
            )
        })
        .collect();
    format!(
        "Compare how these outlets cover the topic \"{topic}\".\n\n\
         Judge how much the sources agree on the facts (consensus_level, 0-100), list concrete \
         contradictions between them, name propaganda or manipulation patterns you see, estimate \
         overall factual accuracy (0-100), and give the share of coverage by political leaning \
         as percentages.\n\n\
         {articles}\
         Respond with a single JSON object matching this schema:\n{schema}"
    )
}

/// Service distribution if it carries any weight, else one computed from labels.
pub fn resolve_distribution(
    reported: Option<ReportedBiasDistribution>,
    labels: impl IntoIterator<Item = Bias>,
) -> BiasDistribution {
    let usable = reported.filter(|d| {
        [d.left, d.center, d.right]
            .iter()
            .any(|v| v.is_finite() && *v > 0.0)
    });
    match usable {
        Some(d) => BiasDistribution::normalized(d.left, d.center, d.right),
        None => BiasDistribution::from_labels(labels),
    }
}

pub fn normalize_verdict(cluster: &TopicCluster, raw: CoverageVerdict) -> CrossSourceVerdict {
    CrossSourceVerdict {
        sources: cluster.distinct_sources(),
        consensus_level: clamp_score(raw.consensus_level),
        discrepancies: clean_labels(raw.major_discrepancies),
        propaganda_patterns: clean_labels(raw.propaganda_patterns),
        factual_accuracy: clamp_score(raw.factual_accuracy),
        bias_distribution: resolve_distribution(
            raw.bias_distribution,
            cluster.articles.iter().map(|a| a.bias()),
        ),
        manipulation_assessment: raw.manipulation_assessment.trim().to_string(),
        public_impact: raw.public_impact.trim().to_string(),
    }
}

pub struct Comparator {
    intelligence: Arc<dyn Intelligence>,
}

impl Comparator {
    pub fn new(intelligence: Arc<dyn Intelligence>) -> Self {
        Self { intelligence }
    }

    pub async fn compare(&self, cluster: &TopicCluster) -> ComparisonOutcome {
        if !cluster.is_cross_source() {
            return ComparisonOutcome::SingleSource;
        }

        let excerpts = excerpts(cluster);
        let request = ComparisonRequest {
            prompt: build_comparison_prompt(&cluster.topic, &excerpts),
            topic: cluster.topic.clone(),
            excerpts,
        };

        match self.intelligence.compare_coverage(&request).await {
            Ok(raw) => {
                let verdict = normalize_verdict(cluster, raw);
                info!(
                    topic = %cluster.topic,
                    sources = verdict.sources.len(),
                    consensus = verdict.consensus_level,
                    "Coverage compared"
                );
                ComparisonOutcome::Compared(verdict)
            }
            Err(e) => {
                warn!(
                    topic = %cluster.topic,
                    error = %e,
                    "Comparison unavailable, abandoning topic"
                );
                ComparisonOutcome::Abandoned {
                    reason: e.to_string(),
                }
            }
        }
    }
}
