use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Clamp any intermediate score onto the closed 0..=100 scale.
///
/// NaN maps to 0 so a degenerate input can never escape the bounds.
pub fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Left,
    Center,
    Right,
}

impl Bias {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" | "center-left" | "left-leaning" => Some(Bias::Left),
            "center" | "centre" | "neutral" => Some(Bias::Center),
            "right" | "center-right" | "right-leaning" => Some(Bias::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bias::Left => "left",
            Bias::Center => "center",
            Bias::Right => "right",
        }
    }
}

impl std::fmt::Display for Bias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    Government,
    Mainstream,
    Alternative,
}

impl std::fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceCategory::Government => write!(f, "government"),
            SourceCategory::Mainstream => write!(f, "mainstream"),
            SourceCategory::Alternative => write!(f, "alternative"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Neutral,
    Positive,
    Negative,
    Angry,
    Fearful,
    Hopeful,
}

impl Tone {
    /// Unknown labels collapse to `Neutral`.
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "positive" => Tone::Positive,
            "negative" => Tone::Negative,
            "angry" => Tone::Angry,
            "fearful" => Tone::Fearful,
            "hopeful" => Tone::Hopeful,
            _ => Tone::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::Positive => "positive",
            Tone::Negative => "negative",
            Tone::Angry => "angry",
            Tone::Fearful => "fearful",
            Tone::Hopeful => "hopeful",
        }
    }

    pub fn is_alarming(&self) -> bool {
        matches!(self, Tone::Angry | Tone::Fearful)
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Source ---

/// A news outlet. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub home_url: String,
    pub feed_url: String,
    pub bias: Bias,
    /// Baseline credibility, 0-100.
    pub credibility: u8,
    pub category: SourceCategory,
}

// --- Article ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Claim {
    pub text: String,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub verifiable: bool,
}

/// Where the analyzed body text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyOrigin {
    Page,
    FeedSummary,
}

impl BodyOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyOrigin::Page => "page",
            BodyOrigin::FeedSummary => "feed_summary",
        }
    }
}

/// Who produced the qualitative analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOrigin {
    Service,
    LocalFallback,
}

impl AnalysisOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisOrigin::Service => "service",
            AnalysisOrigin::LocalFallback => "local_fallback",
        }
    }
}

/// Fields fixed by the fetcher. Publish metadata never changes after first sight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleCore {
    /// Natural key.
    pub url: String,
    pub title: String,
    pub source_name: String,
    /// Feed summary or description, HTML stripped.
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source_bias: Bias,
    pub source_credibility: u8,
}

/// Derived analysis attached once by the enricher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentFields {
    pub techniques: Vec<String>,
    pub topics: Vec<String>,
    pub officials: Vec<String>,
    /// 0-100.
    pub factuality: u8,
    pub tone: Tone,
    pub claims: Vec<Claim>,
    /// Set when the analysis disagreed with the outlet's declared leaning.
    pub bias_override: Option<Bias>,
    /// Text the analysis ran over (page body or feed summary).
    pub body: String,
    pub body_origin: BodyOrigin,
    pub analysis_origin: AnalysisOrigin,
    /// Article public-impact score, 0-100.
    pub impact_score: u8,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub core: ArticleCore,
    pub enrichment: Option<EnrichmentFields>,
}

impl Article {
    pub fn bare(core: ArticleCore) -> Self {
        Self {
            core,
            enrichment: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.core.url
    }

    pub fn is_enriched(&self) -> bool {
        self.enrichment.is_some()
    }

    /// Analysis override if present, else the source's declared leaning.
    pub fn bias(&self) -> Bias {
        self.enrichment
            .as_ref()
            .and_then(|e| e.bias_override)
            .unwrap_or(self.core.source_bias)
    }

    pub fn topics(&self) -> &[String] {
        self.enrichment
            .as_ref()
            .map(|e| e.topics.as_slice())
            .unwrap_or(&[])
    }

    /// Best available body: enriched text, else the feed summary.
    pub fn body(&self) -> &str {
        self.enrichment
            .as_ref()
            .map(|e| e.body.as_str())
            .unwrap_or(&self.core.summary)
    }
}

// --- Comparison ---

/// Percentages of coverage per leaning. Always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BiasDistribution {
    pub left: u8,
    pub center: u8,
    pub right: u8,
}

impl BiasDistribution {
    /// Normalize arbitrary non-negative weights to integer percentages summing
    /// to exactly 100 (largest-remainder rounding). All-zero input is treated
    /// as an even split.
    pub fn normalized(left: f64, center: f64, right: f64) -> Self {
        let sanitize = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let weights = [sanitize(left), sanitize(center), sanitize(right)];
        // Rescale against the largest weight so huge inputs cannot overflow the sum.
        let max = weights.iter().cloned().fold(0.0, f64::max);
        let weights = if max == 0.0 {
            [1.0, 1.0, 1.0]
        } else {
            weights.map(|w| w / max)
        };
        let total: f64 = weights.iter().sum();

        let exact: Vec<f64> = weights.iter().map(|w| w / total * 100.0).collect();
        let mut floors: Vec<u8> = exact.iter().map(|v| v.floor() as u8).collect();
        let assigned: u32 = floors.iter().map(|&v| v as u32).sum();

        let mut order: Vec<usize> = (0..3).collect();
        order.sort_by(|&a, &b| {
            let ra = exact[a] - exact[a].floor();
            let rb = exact[b] - exact[b].floor();
            rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
        });
        for &i in order.iter().take(100u32.saturating_sub(assigned) as usize) {
            floors[i] += 1;
        }

        Self {
            left: floors[0],
            center: floors[1],
            right: floors[2],
        }
    }

    pub fn from_labels(labels: impl IntoIterator<Item = Bias>) -> Self {
        let (mut l, mut c, mut r) = (0.0, 0.0, 0.0);
        for bias in labels {
            match bias {
                Bias::Left => l += 1.0,
                Bias::Center => c += 1.0,
                Bias::Right => r += 1.0,
            }
        }
        Self::normalized(l, c, r)
    }

    pub fn total(&self) -> u32 {
        self.left as u32 + self.center as u32 + self.right as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiversityLabel {
    Homogeneous,
    ModerateDiversity,
    HighDiversity,
}

impl std::fmt::Display for DiversityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiversityLabel::Homogeneous => write!(f, "homogeneous"),
            DiversityLabel::ModerateDiversity => write!(f, "moderate diversity"),
            DiversityLabel::HighDiversity => write!(f, "high diversity"),
        }
    }
}

/// Deterministic indices computed for a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterScores {
    pub public_interest: u8,
    pub credibility: u8,
    pub bias_spread: u8,
    pub diversity: DiversityLabel,
}

/// Cross-source verdict for one topic. Only ever built from two or more sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Unique key.
    pub topic: String,
    pub sources: Vec<String>,
    pub consensus_level: u8,
    pub discrepancies: Vec<String>,
    pub propaganda_patterns: Vec<String>,
    pub factual_accuracy: u8,
    pub bias_distribution: BiasDistribution,
    pub manipulation_assessment: String,
    pub public_impact: String,
    pub article_count: usize,
    pub scores: ClusterScores,
    pub analyzed_at: DateTime<Utc>,
}
