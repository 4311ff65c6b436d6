use std::collections::BTreeSet;
use std::sync::LazyLock;

use async_trait::async_trait;

use newslens_common::{BiasDistribution, NewsLensError, Tone};

use super::{
    AnalysisRequest, ArticleAnalysis, ComparisonRequest, CoverageVerdict, Intelligence,
    ReportedBiasDistribution,
};
use crate::pipeline::enricher::FALLBACK_FACTUALITY;
use crate::pipeline::text::{jaccard, tokens};
use crate::vocabulary::{local_officials, local_topics, TermMatcher};

const ANGRY_TERMS: &[&str] = &["outrage", "furious", "slams", "blasts", "fury", "betrayal"];
const FEARFUL_TERMS: &[&str] = &["fear", "threat", "crisis", "danger", "warning", "alarm"];
const HOPEFUL_TERMS: &[&str] =
    &["hope", "hopeful", "breakthrough", "promise", "optimism", "optimistic", "recovery"];
const NEGATIVE_TERMS: &[&str] =
    &["fail", "failed", "failure", "decline", "declined", "loss", "cuts", "criticism", "worse"];
const POSITIVE_TERMS: &[&str] =
    &["success", "growth", "improve", "improved", "win", "praised", "record high"];

/// Checked in order; the first tone with the most hits wins.
static TONES: LazyLock<Vec<(Tone, TermMatcher)>> = LazyLock::new(|| {
    vec![
        (Tone::Angry, TermMatcher::new(ANGRY_TERMS)),
        (Tone::Fearful, TermMatcher::new(FEARFUL_TERMS)),
        (Tone::Hopeful, TermMatcher::new(HOPEFUL_TERMS)),
        (Tone::Negative, TermMatcher::new(NEGATIVE_TERMS)),
        (Tone::Positive, TermMatcher::new(POSITIVE_TERMS)),
    ]
});

/// (technique, cue phrases)
const TECHNIQUE_CUES: &[(&str, &[&str])] = &[
    ("loaded language", &["radical", "disastrous", "shameful", "extremist", "catastroph"]),
    ("fear appeal", &["will destroy", "threatens our", "under attack", "existential"]),
    ("appeal to authority", &["experts agree", "scientists say", "officials insist"]),
    ("false dilemma", &["either we", "the only option", "no alternative"]),
    ("ad hominem", &["liar", "corrupt politician", "incompetent"]),
    ("bandwagon", &["everyone knows", "most canadians agree", "growing chorus"]),
];

/// Points of consensus per unit of mean pairwise lexical overlap.
const CONSENSUS_PER_OVERLAP: f64 = 150.0;
/// Factuality gap between two sources worth reporting as a discrepancy.
const FACTUALITY_GAP: u8 = 20;

/// Deterministic, offline stand-in for the analysis service.
#[derive(Debug, Default, Clone)]
pub struct HeuristicIntelligence;

impl HeuristicIntelligence {
    pub fn new() -> Self {
        Self
    }
}

fn detect_tone(text: &str) -> Tone {
    let mut best = (Tone::Neutral, 0);
    for (tone, matcher) in TONES.iter() {
        let hits = matcher.count(text);
        if hits > best.1 {
            best = (*tone, hits);
        }
    }
    best.0
}

fn detect_techniques(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TECHNIQUE_CUES
        .iter()
        .filter(|(_, cues)| cues.iter().any(|c| lower.contains(c)))
        .map(|(name, _)| name.to_string())
        .collect()
}

#[async_trait]
impl Intelligence for HeuristicIntelligence {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn analyze_article(
        &self,
        request: &AnalysisRequest,
    ) -> Result<ArticleAnalysis, NewsLensError> {
        let text = format!("{}\n{}", request.title, request.body);
        let techniques = detect_techniques(&text);
        let factuality =
            (FALLBACK_FACTUALITY as f64 - 10.0 * techniques.len() as f64).max(0.0);

        Ok(ArticleAnalysis {
            key_topics: local_topics(&text),
            officials: local_officials(&text),
            factuality_score: factuality,
            emotional_tone: detect_tone(&text).as_str().to_string(),
            manipulation_techniques: techniques,
            claims: Vec::new(),
            bias: None,
        })
    }

    async fn compare_coverage(
        &self,
        request: &ComparisonRequest,
    ) -> Result<CoverageVerdict, NewsLensError> {
        let excerpts = &request.excerpts;
        if excerpts.len() < 2 {
            return Err(NewsLensError::Intelligence(
                "comparison needs at least two excerpts".into(),
            ));
        }

        let token_sets: Vec<_> = excerpts
            .iter()
            .map(|e| tokens(&format!("{} {}", e.title, e.body)))
            .collect();

        let mut overlap_sum = 0.0;
        let mut pairs = 0usize;
        let mut discrepancies = Vec::new();
        for i in 0..excerpts.len() {
            for j in (i + 1)..excerpts.len() {
                overlap_sum += jaccard(&token_sets[i], &token_sets[j]);
                pairs += 1;

                let (a, b) = (&excerpts[i], &excerpts[j]);
                if a.source_name == b.source_name {
                    continue;
                }
                if a.tone != b.tone {
                    discrepancies.push(format!(
                        "{} frames the story as {} while {} is {}",
                        a.source_name, a.tone, b.source_name, b.tone
                    ));
                }
                if a.factuality.abs_diff(b.factuality) >= FACTUALITY_GAP {
                    discrepancies.push(format!(
                        "Factuality diverges: {} ({}) vs {} ({})",
                        a.source_name, a.factuality, b.source_name, b.factuality
                    ));
                }
            }
        }
        let consensus = overlap_sum / pairs as f64 * CONSENSUS_PER_OVERLAP;

        let patterns: BTreeSet<String> = excerpts
            .iter()
            .flat_map(|e| e.techniques.iter().cloned())
            .collect();
        let accuracy =
            excerpts.iter().map(|e| e.factuality as f64).sum::<f64>() / excerpts.len() as f64;
        let dist = BiasDistribution::from_labels(excerpts.iter().map(|e| e.bias));

        let manipulation_assessment = if patterns.is_empty() {
            "No recurring manipulation techniques detected across sources.".to_string()
        } else {
            format!(
                "{} technique(s) detected across sources: {}.",
                patterns.len(),
                patterns.iter().cloned().collect::<Vec<_>>().join(", ")
            )
        };
        let public_impact = format!(
            "Covered by {} articles on '{}'; {} point(s) of disagreement.",
            excerpts.len(),
            request.topic,
            discrepancies.len()
        );

        Ok(CoverageVerdict {
            consensus_level: consensus,
            major_discrepancies: discrepancies,
            propaganda_patterns: patterns.into_iter().collect(),
            factual_accuracy: accuracy,
            bias_distribution: Some(ReportedBiasDistribution {
                left: dist.left as f64,
                center: dist.center as f64,
                right: dist.right as f64,
            }),
            manipulation_assessment,
            public_impact,
        })
    }
}
