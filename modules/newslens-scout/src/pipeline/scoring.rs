//! Deterministic indices. Nothing here touches the intelligence service.
//!
//! Every public function returns a value on the closed 0..=100 scale no matter
//! how large the intermediate sums get. Sub-factors are clamped before they are
//! weighted and the weighted total is clamped again.

use std::collections::{BTreeMap, BTreeSet};

use newslens_common::{clamp_score, Article, Bias, ClusterScores, DiversityLabel, Tone};

use crate::vocabulary::{CONTROVERSY, ECONOMIC, POLICY, SAFETY};

// --- Article impact ---

const IMPACT_BASE: f64 = 50.0;
const IMPACT_OFFICIAL_BONUS: f64 = 20.0;
const IMPACT_PER_TECHNIQUE: f64 = 5.0;
const IMPACT_ALARMING_TONE_BONUS: f64 = 15.0;
const IMPACT_LOW_CREDIBILITY_BONUS: f64 = 10.0;
/// Sources below this credibility get the low-credibility bonus.
const LOW_CREDIBILITY_THRESHOLD: f64 = 70.0;

// --- Public interest weights (sum to 1.0) ---

pub const WEIGHT_OFFICIAL_INVOLVEMENT: f64 = 0.20;
pub const WEIGHT_POLICY_IMPACT: f64 = 0.25;
pub const WEIGHT_PUBLIC_SAFETY: f64 = 0.20;
pub const WEIGHT_ECONOMIC_IMPACT: f64 = 0.15;
pub const WEIGHT_SOURCE_CREDIBILITY: f64 = 0.10;
pub const WEIGHT_CONTROVERSY: f64 = 0.10;

/// Points per distinct named official in a cluster.
pub const POINTS_PER_OFFICIAL: f64 = 25.0;
/// Points per vocabulary hit in the keyword-density sub-factors.
pub const POINTS_PER_KEYWORD_HIT: f64 = 10.0;

// --- Overall credibility weights (sum to 1.0) ---

pub const WEIGHT_AVG_CREDIBILITY: f64 = 0.40;
pub const WEIGHT_SOURCE_DIVERSITY: f64 = 0.30;
pub const WEIGHT_FACTUAL_ACCURACY: f64 = 0.30;
/// Points per distinct contributing source.
pub const POINTS_PER_SOURCE: f64 = 10.0;

// --- Bias spread ---

const HOMOGENEOUS_BELOW: i32 = 20;
const MODERATE_BELOW: i32 = 50;

/// Article public-impact score.
pub fn article_impact(officials: usize, techniques: usize, tone: Tone, credibility: f64) -> u8 {
    let mut score = IMPACT_BASE;
    if officials > 0 {
        score += IMPACT_OFFICIAL_BONUS;
    }
    score += IMPACT_PER_TECHNIQUE * techniques as f64;
    if tone.is_alarming() {
        score += IMPACT_ALARMING_TONE_BONUS;
    }
    if credibility < LOW_CREDIBILITY_THRESHOLD {
        score += IMPACT_LOW_CREDIBILITY_BONUS;
    }
    clamp_score(score)
}

/// Used for spread only; never stored as an article's bias.
pub fn bias_numeric(bias: Bias) -> i32 {
    match bias {
        Bias::Left => -50,
        Bias::Center => 0,
        Bias::Right => 50,
    }
}

/// Raw, unclamped public-interest inputs for a cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PublicInterestFactors {
    pub official_involvement: f64,
    pub policy_impact: f64,
    pub public_safety: f64,
    pub economic_impact: f64,
    pub avg_credibility: f64,
    pub controversy: f64,
}

impl PublicInterestFactors {
    /// Keyword sub-factors count hits over every title and body in the cluster.
    pub fn from_articles(articles: &[&Article]) -> Self {
        let text = articles
            .iter()
            .map(|a| format!("{}\n{}", a.core.title, a.body()))
            .collect::<Vec<_>>()
            .join("\n");

        let officials: BTreeSet<String> = articles
            .iter()
            .filter_map(|a| a.enrichment.as_ref())
            .flat_map(|e| e.officials.iter().map(|o| o.to_lowercase()))
            .collect();

        Self {
            official_involvement: officials.len() as f64 * POINTS_PER_OFFICIAL,
            policy_impact: POLICY.count(&text) as f64 * POINTS_PER_KEYWORD_HIT,
            public_safety: SAFETY.count(&text) as f64 * POINTS_PER_KEYWORD_HIT,
            economic_impact: ECONOMIC.count(&text) as f64 * POINTS_PER_KEYWORD_HIT,
            avg_credibility: average_credibility(articles),
            controversy: CONTROVERSY.count(&text) as f64 * POINTS_PER_KEYWORD_HIT,
        }
    }
}

pub fn weighted_public_interest(f: &PublicInterestFactors) -> u8 {
    let c = |v: f64| clamp_score(v) as f64;
    clamp_score(
        c(f.official_involvement) * WEIGHT_OFFICIAL_INVOLVEMENT
            + c(f.policy_impact) * WEIGHT_POLICY_IMPACT
            + c(f.public_safety) * WEIGHT_PUBLIC_SAFETY
            + c(f.economic_impact) * WEIGHT_ECONOMIC_IMPACT
            + c(f.avg_credibility) * WEIGHT_SOURCE_CREDIBILITY
            + c(f.controversy) * WEIGHT_CONTROVERSY,
    )
}

/// 40% average credibility, 30% source diversity, 30% reported factual accuracy.
pub fn overall_credibility(
    avg_credibility: f64,
    distinct_sources: usize,
    factual_accuracy: f64,
) -> u8 {
    let c = |v: f64| clamp_score(v) as f64;
    clamp_score(
        c(avg_credibility) * WEIGHT_AVG_CREDIBILITY
            + c(distinct_sources as f64 * POINTS_PER_SOURCE) * WEIGHT_SOURCE_DIVERSITY
            + c(factual_accuracy) * WEIGHT_FACTUAL_ACCURACY,
    )
}

/// Max minus min of the numeric mapping; 0 for fewer than two labels.
pub fn bias_spread(biases: impl IntoIterator<Item = Bias>) -> i32 {
    let values: Vec<i32> = biases.into_iter().map(bias_numeric).collect();
    match (values.iter().max(), values.iter().min()) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    }
}

pub fn diversity_label(spread: i32) -> DiversityLabel {
    if spread < HOMOGENEOUS_BELOW {
        DiversityLabel::Homogeneous
    } else if spread < MODERATE_BELOW {
        DiversityLabel::ModerateDiversity
    } else {
        DiversityLabel::HighDiversity
    }
}

/// Mean baseline credibility over the distinct sources behind `articles`.
pub fn average_credibility(articles: &[&Article]) -> f64 {
    let by_source: BTreeMap<&str, u8> = articles
        .iter()
        .map(|a| (a.core.source_name.as_str(), a.core.source_credibility))
        .collect();
    if by_source.is_empty() {
        return 0.0;
    }
    by_source.values().map(|&c| c as f64).sum::<f64>() / by_source.len() as f64
}

/// All cluster-level indices for a compared cluster.
pub fn score_cluster(
    articles: &[&Article],
    distinct_sources: usize,
    factual_accuracy: f64,
) -> ClusterScores {
    let factors = PublicInterestFactors::from_articles(articles);
    let spread = bias_spread(articles.iter().map(|a| a.bias()));
    ClusterScores {
        public_interest: weighted_public_interest(&factors),
        credibility: overall_credibility(
            factors.avg_credibility,
            distinct_sources,
            factual_accuracy,
        ),
        bias_spread: clamp_score(spread as f64),
        diversity: diversity_label(spread),
    }
}

#[cfg(test)]
mod tests {
    use newslens_common::ArticleCore;

    use super::*;

    fn article(title: &str, credibility: u8, bias: Bias) -> Article {
        sourced(title, &format!("Outlet {credibility}"), credibility, bias)
    }

    fn sourced(title: &str, source: &str, credibility: u8, bias: Bias) -> Article {
        Article::bare(ArticleCore {
            url: format!("https://x.example/{title}"),
            title: title.into(),
            source_name: source.into(),
            summary: String::new(),
            published_at: None,
            source_bias: bias,
            source_credibility: credibility,
        })
    }

    #[test]
    fn impact_formula() {
        assert_eq!(article_impact(0, 0, Tone::Neutral, 80.0), 50);
        assert_eq!(article_impact(2, 0, Tone::Neutral, 80.0), 70);
        assert_eq!(article_impact(0, 3, Tone::Neutral, 80.0), 65);
        assert_eq!(article_impact(0, 0, Tone::Angry, 80.0), 65);
        assert_eq!(article_impact(0, 0, Tone::Hopeful, 69.0), 60);
        assert_eq!(article_impact(1, 50, Tone::Fearful, 10.0), 100);
    }

    #[test]
    fn diversity_boundaries() {
        assert_eq!(diversity_label(0), DiversityLabel::Homogeneous);
        assert_eq!(diversity_label(19), DiversityLabel::Homogeneous);
        assert_eq!(diversity_label(20), DiversityLabel::ModerateDiversity);
        assert_eq!(diversity_label(25), DiversityLabel::ModerateDiversity);
        assert_eq!(diversity_label(49), DiversityLabel::ModerateDiversity);
        assert_eq!(diversity_label(50), DiversityLabel::HighDiversity);
        assert_eq!(diversity_label(75), DiversityLabel::HighDiversity);
    }

    #[test]
    fn spread_over_labels() {
        assert_eq!(bias_spread([Bias::Center, Bias::Center]), 0);
        assert_eq!(bias_spread([Bias::Center, Bias::Right]), 50);
        assert_eq!(bias_spread([Bias::Left, Bias::Center, Bias::Right]), 100);
        assert_eq!(bias_spread(Vec::<Bias>::new()), 0);
    }

    #[test]
    fn public_interest_weights_sum_to_one() {
        let total = WEIGHT_OFFICIAL_INVOLVEMENT
            + WEIGHT_POLICY_IMPACT
            + WEIGHT_PUBLIC_SAFETY
            + WEIGHT_ECONOMIC_IMPACT
            + WEIGHT_SOURCE_CREDIBILITY
            + WEIGHT_CONTROVERSY;
        assert!((total - 1.0).abs() < 1e-9);

        let maxed = PublicInterestFactors {
            official_involvement: 1e9,
            policy_impact: 1e9,
            public_safety: 1e9,
            economic_impact: 1e9,
            avg_credibility: 1e9,
            controversy: 1e9,
        };
        assert_eq!(weighted_public_interest(&maxed), 100);
        assert_eq!(weighted_public_interest(&PublicInterestFactors::default()), 0);
    }

    #[test]
    fn sub_factors_are_clamped_before_weighting() {
        // One huge factor cannot carry the total past its own weight.
        let f = PublicInterestFactors {
            policy_impact: 10_000.0,
            ..Default::default()
        };
        assert_eq!(weighted_public_interest(&f), 25);
    }

    #[test]
    fn keyword_hits_drive_policy_factor() {
        let a = article("Budget vote tonight", 80, Bias::Center);
        let f = PublicInterestFactors::from_articles(&[&a]);
        assert_eq!(f.policy_impact, POINTS_PER_KEYWORD_HIT);
        assert_eq!(f.avg_credibility, 80.0);
    }

    #[test]
    fn keyword_hits_ignore_partial_words() {
        let a = article("The impact of the fact: a billion in lawyer fees", 80, Bias::Center);
        let f = PublicInterestFactors::from_articles(&[&a]);
        assert_eq!(f.policy_impact, 0.0);
    }

    #[test]
    fn average_credibility_counts_each_source_once() {
        let a = sourced("Budget one", "Big Outlet", 40, Bias::Right);
        let b = sourced("Budget two", "Big Outlet", 40, Bias::Right);
        let c = sourced("Budget three", "Big Outlet", 40, Bias::Right);
        let d = sourced("Budget four", "Small Outlet", 90, Bias::Center);
        assert_eq!(average_credibility(&[&a, &b, &c, &d]), 65.0);
        assert_eq!(average_credibility(&[]), 0.0);
    }

    #[test]
    fn credibility_formula() {
        // 0.4*65 + 0.3*20 + 0.3*80 = 26 + 6 + 24
        assert_eq!(overall_credibility(65.0, 2, 80.0), 56);
        assert_eq!(overall_credibility(100.0, 40, 100.0), 100);
        assert_eq!(overall_credibility(-5.0, 0, f64::NAN), 0);
    }

    #[test]
    fn cluster_scores_use_article_bias() {
        let a = article("Budget hearing", 85, Bias::Center);
        let b = article("Budget hearing today", 45, Bias::Right);
        let scores = score_cluster(&[&a, &b], 2, 70.0);
        assert_eq!(scores.bias_spread, 50);
        assert_eq!(scores.diversity, DiversityLabel::HighDiversity);
        // avg credibility 65 -> 0.4*65 + 0.3*20 + 0.3*70
        assert_eq!(scores.credibility, 53);
        assert!(scores.public_interest > 0);
    }
}
