//! Qualitative analysis capability.
//!
//! One production implementation (Claude over HTTP) and one deterministic
//! implementation (local heuristics), selected by configuration. Callers
//! treat every error as "service unavailable" and apply their own fallback.

mod claude;
mod heuristic;

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use newslens_common::{Bias, Claim, Config, IntelligenceProvider, NewsLensError, Tone};

pub use claude::ClaudeIntelligence;
pub use heuristic::HeuristicIntelligence;

// ---------------------------------------------------------------------------
// Article analysis
// ---------------------------------------------------------------------------

/// Rendered prompt plus the inputs it was built from.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub prompt: String,
    pub title: String,
    pub source_name: String,
    /// Body text already cut to the prompt budget.
    pub body: String,
}

/// What the service returns for one article.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ArticleAnalysis {
    /// Manipulation techniques present (e.g. "loaded language", "false dilemma").
    #[serde(default)]
    pub manipulation_techniques: Vec<String>,
    /// Short topic labels (e.g. "Federal Budget", "Immigration").
    #[serde(default)]
    pub key_topics: Vec<String>,
    /// Public officials named in the article.
    #[serde(default)]
    pub officials: Vec<String>,
    /// 0-100 estimate of factual reliability.
    #[serde(default = "default_factuality")]
    pub factuality_score: f64,
    /// One of: neutral, positive, negative, angry, fearful, hopeful.
    #[serde(default)]
    pub emotional_tone: String,
    /// Checkable statements made by the article.
    #[serde(default)]
    pub claims: Vec<Claim>,
    /// Political leaning of this article if it differs from its outlet: left, center, right.
    #[serde(default)]
    pub bias: Option<String>,
}

fn default_factuality() -> f64 {
    crate::pipeline::enricher::FALLBACK_FACTUALITY as f64
}

// ---------------------------------------------------------------------------
// Cross-source comparison
// ---------------------------------------------------------------------------

/// One article as presented to the comparison prompt.
#[derive(Debug, Clone)]
pub struct CoverageExcerpt {
    pub source_name: String,
    pub title: String,
    pub bias: Bias,
    pub body: String,
    pub tone: Tone,
    pub factuality: u8,
    pub techniques: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    pub prompt: String,
    pub topic: String,
    pub excerpts: Vec<CoverageExcerpt>,
}

/// Raw percentages as the service reports them; normalized by the comparator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct ReportedBiasDistribution {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub center: f64,
    #[serde(default)]
    pub right: f64,
}

/// What the service returns for a cluster.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CoverageVerdict {
    /// 0-100: how much the sources agree on the facts.
    pub consensus_level: f64,
    /// Concrete points where sources contradict each other.
    #[serde(default)]
    pub major_discrepancies: Vec<String>,
    /// Propaganda or manipulation patterns seen across the coverage.
    #[serde(default)]
    pub propaganda_patterns: Vec<String>,
    /// 0-100 estimate of overall factual accuracy.
    pub factual_accuracy: f64,
    /// Share of coverage per leaning, in percent.
    #[serde(default)]
    pub bias_distribution: Option<ReportedBiasDistribution>,
    /// Free-text assessment of manipulation.
    #[serde(default)]
    pub manipulation_assessment: String,
    /// Free-text assessment of public impact.
    #[serde(default)]
    pub public_impact: String,
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Intelligence: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze_article(
        &self,
        request: &AnalysisRequest,
    ) -> Result<ArticleAnalysis, NewsLensError>;

    async fn compare_coverage(
        &self,
        request: &ComparisonRequest,
    ) -> Result<CoverageVerdict, NewsLensError>;
}

/// Build the configured implementation.
pub fn from_config(config: &Config) -> Result<Arc<dyn Intelligence>, NewsLensError> {
    match config.intelligence_provider {
        IntelligenceProvider::Claude => {
            let api_key = config.anthropic_api_key.as_deref().ok_or_else(|| {
                NewsLensError::Config(
                    "ANTHROPIC_API_KEY is required for the claude provider".into(),
                )
            })?;
            Ok(Arc::new(ClaudeIntelligence::new(
                api_key,
                &config.claude_model,
                config.ai_timeout,
                &config.user_agent,
            )))
        }
        IntelligenceProvider::Heuristic => Ok(Arc::new(HeuristicIntelligence::new())),
    }
}
