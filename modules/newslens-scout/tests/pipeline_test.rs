//! End-to-end cycles over in-memory doubles: no network, no database.

use std::sync::Arc;
use std::time::Duration;

use newslens_common::{
    AnalysisOrigin, Article, ArticleCore, Bias, BiasDistribution, BodyOrigin, DiversityLabel,
    NewsLensError, Tone,
};
use newslens_scout::intelligence::{ArticleAnalysis, CoverageVerdict, ReportedBiasDistribution};
use newslens_scout::pipeline::scoring::{
    weighted_public_interest, PublicInterestFactors, POINTS_PER_KEYWORD_HIT,
};
use newslens_scout::scheduler::run_forever;
use newslens_scout::scout::{RunPhase, Scout, ScoutSettings};
use newslens_scout::sources::SourceRegistry;
use newslens_scout::traits::NewsStore;
use newslens_scout::testing::{
    rss_feed, test_source, MemoryStore, MockFetcher, MockIntelligence,
};

const OCT_8_10AM: &str = "Wed, 08 Oct 2025 10:00:00 GMT";
const OCT_8_NOON: &str = "Wed, 08 Oct 2025 12:00:00 GMT";

fn scout(
    sources: Vec<newslens_common::Source>,
    fetcher: Arc<MockFetcher>,
    ai: Arc<MockIntelligence>,
    store: Arc<MemoryStore>,
) -> Scout {
    Scout::new(
        SourceRegistry::new(sources),
        fetcher,
        ai,
        store,
        ScoutSettings::unpaced(),
    )
}

#[tokio::test]
async fn near_duplicate_budget_stories_are_compared_across_sources() {
    let hill = test_source("Hill Times", Bias::Center, 85);
    let wire = test_source("Right Wire", Bias::Right, 45);
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_feed(
                &hill.feed_url,
                rss_feed(&[(
                    "Bill C-12 budget hearing opens in Ottawa",
                    "https://hill-times.example/c12",
                    "MPs question the finance minister on the budget bill.",
                    OCT_8_10AM,
                )]),
            )
            .on_feed(
                &wire.feed_url,
                rss_feed(&[(
                    "Bill C-12 budget hearing opens amid criticism",
                    "https://right-wire.example/c12",
                    "Critics slam the budget bill at hearing.",
                    OCT_8_NOON,
                )]),
            ),
    );
    let ai = Arc::new(MockIntelligence::new());
    let store = Arc::new(MemoryStore::new());

    let stats = scout(vec![hill, wire], fetcher, ai.clone(), store.clone())
        .run_cycle()
        .await;

    assert_eq!(stats.sources_fetched, 2);
    assert_eq!(stats.clusters, 1);
    assert_eq!(ai.compare_calls(), 1);
    assert_eq!(ai.compared_topics(), vec!["Federal Budget".to_string()]);

    let comparison = store.comparison("Federal Budget").expect("comparison persisted");
    assert_eq!(comparison.sources.len(), 2);
    assert_eq!(comparison.article_count, 2);
    assert_eq!(comparison.bias_distribution.total(), 100);
    assert_eq!(comparison.scores.bias_spread, 50);

    let stored = store.articles();
    let refs: Vec<&Article> = stored.iter().collect();
    let factors = PublicInterestFactors::from_articles(&refs);
    assert!(factors.policy_impact >= POINTS_PER_KEYWORD_HIT);
    assert_eq!(comparison.scores.public_interest, weighted_public_interest(&factors));

    let without_policy = PublicInterestFactors {
        policy_impact: 0.0,
        ..factors
    };
    assert!(comparison.scores.public_interest > weighted_public_interest(&without_policy));
}

#[tokio::test]
async fn single_source_topic_persists_article_but_no_comparison() {
    let solo = test_source("Solo Desk", Bias::Left, 70);
    let fetcher = Arc::new(MockFetcher::new().on_feed(
        &solo.feed_url,
        rss_feed(&[(
            "Pharmacare bill clears the Senate",
            "https://solo-desk.example/pharmacare",
            "Senators pass the national pharmacare plan.",
            OCT_8_10AM,
        )]),
    ));
    let ai = Arc::new(MockIntelligence::new());
    let store = Arc::new(MemoryStore::new());

    let stats = scout(vec![solo], fetcher, ai.clone(), store.clone())
        .run_cycle()
        .await;

    assert!(stats.clusters >= 1);
    assert_eq!(stats.comparisons_created, 0);
    assert_eq!(stats.comparisons_single_source, stats.clusters);
    assert_eq!(ai.compare_calls(), 0);
    assert!(store.comparisons().is_empty());
    assert!(store.article("https://solo-desk.example/pharmacare").is_some());
}

#[tokio::test]
async fn failing_feed_yields_nothing_and_the_run_continues() {
    let down = test_source("Down Daily", Bias::Center, 80);
    let up = test_source("Up Gazette", Bias::Center, 80);
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_feed_status(&down.feed_url, 503)
            .on_feed(
                &up.feed_url,
                rss_feed(&[(
                    "Premier announces housing plan",
                    "https://up-gazette.example/housing",
                    "The province unveils new rent rules.",
                    OCT_8_10AM,
                )]),
            ),
    );
    let store = Arc::new(MemoryStore::new());

    let stats = scout(
        vec![down, up],
        fetcher.clone(),
        Arc::new(MockIntelligence::new()),
        store.clone(),
    )
    .run_cycle()
    .await;

    assert_eq!(fetcher.feed_requests(), 2);
    assert_eq!(stats.sources_failed, 1);
    assert_eq!(stats.sources_fetched, 1);
    let stored = store.articles();
    assert_eq!(stored.len(), 1);
    assert!(stored.iter().all(|a| a.core.source_name == "Up Gazette"));
}

#[tokio::test]
async fn feed_status_400_and_above_yields_zero_articles() {
    for status in [400u16, 404, 410, 429, 500] {
        let source = test_source("Flaky News", Bias::Right, 50);
        let fetcher = Arc::new(MockFetcher::new().on_feed_status(&source.feed_url, status));
        let store = Arc::new(MemoryStore::new());
        let stats = scout(
            vec![source],
            fetcher,
            Arc::new(MockIntelligence::new()),
            store.clone(),
        )
        .run_cycle()
        .await;
        assert_eq!(stats.articles_fetched, 0, "status {status}");
        assert_eq!(stats.sources_failed, 1, "status {status}");
        assert!(store.articles().is_empty());
    }
}

#[tokio::test]
async fn intelligence_outage_falls_back_to_local_analysis() {
    let source = test_source("Capital Wire", Bias::Center, 75);
    let fetcher = Arc::new(MockFetcher::new().on_feed(
        &source.feed_url,
        rss_feed(&[(
            "Budget deficit grows, Mark Carney concedes",
            "https://capital-wire.example/deficit",
            "The federal budget deficit widened again.",
            OCT_8_10AM,
        )]),
    ));
    let ai = Arc::new(MockIntelligence::unavailable());
    let store = Arc::new(MemoryStore::new());

    let stats = scout(vec![source], fetcher, ai.clone(), store.clone())
        .run_cycle()
        .await;

    assert_eq!(ai.analyze_calls(), 1);
    assert_eq!(stats.articles_enriched, 1);
    assert_eq!(stats.articles_degraded, 1);

    let article = store
        .article("https://capital-wire.example/deficit")
        .expect("article persisted");
    let e = article.enrichment.expect("enrichment always present");
    assert_eq!(e.factuality, 70);
    assert_eq!(e.tone, Tone::Neutral);
    assert_eq!(e.topics, vec!["Federal Budget".to_string()]);
    assert_eq!(e.officials, vec!["Mark Carney".to_string()]);
    assert_eq!(e.analysis_origin, AnalysisOrigin::LocalFallback);
    assert_eq!(e.body_origin, BodyOrigin::FeedSummary);
}

#[tokio::test]
async fn comparison_outage_abandons_topic() {
    let a = test_source("East Post", Bias::Left, 80);
    let b = test_source("West Post", Bias::Right, 60);
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_feed(
                &a.feed_url,
                rss_feed(&[(
                    "Carbon tax rebate cut",
                    "https://east-post.example/1",
                    "Ottawa trims rebate.",
                    OCT_8_10AM,
                )]),
            )
            .on_feed(
                &b.feed_url,
                rss_feed(&[(
                    "Carbon tax rebate cut again",
                    "https://west-post.example/1",
                    "Ottawa trims rebate.",
                    OCT_8_NOON,
                )]),
            ),
    );
    let ai = Arc::new(MockIntelligence::new().failing_comparisons());
    let store = Arc::new(MemoryStore::new());

    let stats = scout(vec![a, b], fetcher, ai.clone(), store.clone())
        .run_cycle()
        .await;

    assert!(ai.compare_calls() >= 1);
    assert_eq!(stats.comparisons_created, 0);
    assert_eq!(stats.comparisons_abandoned as usize, ai.compare_calls());
    assert!(store.comparisons().is_empty());
    assert_eq!(store.articles().len(), 2);
}

#[tokio::test]
async fn reupserting_a_url_keeps_first_publish_time() {
    let source = test_source("Ledger", Bias::Center, 90);
    let url = "https://ledger.example/story";
    let store = Arc::new(MemoryStore::new());

    let first = Arc::new(MockFetcher::new().on_feed(
        &source.feed_url,
        rss_feed(&[(
            "Budget vote set for Thursday",
            url,
            "The budget goes to a vote.",
            OCT_8_10AM,
        )]),
    ));
    scout(
        vec![source.clone()],
        first,
        Arc::new(MockIntelligence::new()),
        store.clone(),
    )
    .run_cycle()
    .await;
    let before = store.article(url).unwrap();

    let second = Arc::new(MockFetcher::new().on_feed(
        &source.feed_url,
        rss_feed(&[(
            "Housing vote set for Thursday",
            url,
            "The housing motion goes to a vote.",
            OCT_8_NOON,
        )]),
    ));
    scout(vec![source], second, Arc::new(MockIntelligence::new()), store.clone())
        .run_cycle()
        .await;
    let after = store.article(url).unwrap();

    assert_eq!(after.core.published_at, before.core.published_at);
    assert_eq!(after.core.title, "Budget vote set for Thursday");
    assert_eq!(after.topics(), ["Housing".to_string()]);
    assert!(
        after.enrichment.as_ref().unwrap().analyzed_at
            >= before.enrichment.as_ref().unwrap().analyzed_at
    );
}

#[tokio::test]
async fn persistence_failures_are_counted_not_fatal() {
    let source = test_source("Quiet Times", Bias::Center, 80);
    let fetcher = Arc::new(MockFetcher::new().on_feed(
        &source.feed_url,
        rss_feed(&[
            (
                "Minister resigns over contract",
                "https://quiet-times.example/1",
                "Opposition demands inquiry.",
                OCT_8_10AM,
            ),
            (
                "Senate debates tariff bill",
                "https://quiet-times.example/2",
                "Trade measures advance.",
                OCT_8_NOON,
            ),
        ]),
    ));
    let scout = scout(
        vec![source],
        fetcher,
        Arc::new(MockIntelligence::new()),
        Arc::new(MemoryStore::rejecting()),
    );
    let phase = scout.phase();

    let stats = scout.run_cycle().await;

    assert_eq!(stats.articles_enriched, 2);
    assert_eq!(stats.articles_persisted, 0);
    assert_eq!(stats.persistence_failures, 2);
    assert_eq!(*phase.borrow(), RunPhase::Idle);
}

#[tokio::test]
async fn no_comparison_ever_has_fewer_than_two_sources() {
    let sources = vec![
        test_source("North Star", Bias::Left, 70),
        test_source("South Star", Bias::Center, 70),
        test_source("Lone Star", Bias::Right, 70),
    ];
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_feed(
                &sources[0].feed_url,
                rss_feed(&[
                    (
                        "Immigration targets lowered",
                        "https://north-star.example/1",
                        "Ottawa cuts immigration levels.",
                        OCT_8_10AM,
                    ),
                    (
                        "Defence spending to rise",
                        "https://north-star.example/2",
                        "NATO target in sight.",
                        OCT_8_10AM,
                    ),
                ]),
            )
            .on_feed(
                &sources[1].feed_url,
                rss_feed(&[(
                    "Immigration targets lowered again",
                    "https://south-star.example/1",
                    "Levels cut for refugees.",
                    OCT_8_NOON,
                )]),
            )
            .on_feed(
                &sources[2].feed_url,
                rss_feed(&[(
                    "Pipeline approval delayed",
                    "https://lone-star.example/1",
                    "Cabinet defers the decision.",
                    OCT_8_NOON,
                )]),
            ),
    );
    let store = Arc::new(MemoryStore::new());

    let mut settings = ScoutSettings::unpaced();
    settings.max_concurrent_sources = 3;
    let scout = Scout::new(
        SourceRegistry::new(sources),
        fetcher,
        Arc::new(MockIntelligence::new()),
        store.clone(),
        settings,
    );
    let stats = scout.run_cycle().await;

    assert_eq!(stats.sources_fetched, 3);
    assert!(store.comparison("Immigration").is_some());
    assert!(store.comparisons().iter().all(|c| c.sources.len() >= 2));
    assert_eq!(store.articles().len(), 4);
}

/// Two near-duplicate budget-hearing feeds: Hill Times (center, 85) and Right Wire (right, 45).
fn budget_hearing_feeds() -> (Vec<newslens_common::Source>, MockFetcher) {
    let hill = test_source("Hill Times", Bias::Center, 85);
    let wire = test_source("Right Wire", Bias::Right, 45);
    let fetcher = MockFetcher::new()
        .on_feed(
            &hill.feed_url,
            rss_feed(&[(
                "Bill C-12 budget hearing opens in Ottawa",
                "https://hill-times.example/c12",
                "MPs question the finance minister on the budget bill.",
                OCT_8_10AM,
            )]),
        )
        .on_feed(
            &wire.feed_url,
            rss_feed(&[(
                "Bill C-12 budget hearing opens amid criticism",
                "https://right-wire.example/c12",
                "Critics slam the budget bill at hearing.",
                OCT_8_NOON,
            )]),
        );
    (vec![hill, wire], fetcher)
}

#[tokio::test]
async fn unrelated_stories_stay_apart_during_an_outage() {
    let a = test_source("Capital Daily", Bias::Left, 70);
    let b = test_source("Prairie Post", Bias::Right, 60);
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_feed(
                &a.feed_url,
                rss_feed(&[(
                    "Senate votes on firearms",
                    "https://capital-daily.example/firearms",
                    "The current debate continues.",
                    OCT_8_10AM,
                )]),
            )
            .on_feed(
                &b.feed_url,
                rss_feed(&[(
                    "Premier picks new cabinet",
                    "https://prairie-post.example/cabinet",
                    "A different team for parents.",
                    OCT_8_NOON,
                )]),
            ),
    );
    let ai = Arc::new(MockIntelligence::unavailable());
    let store = Arc::new(MemoryStore::new());

    let stats = scout(vec![a, b], fetcher, ai.clone(), store.clone())
        .run_cycle()
        .await;

    let firearms = store
        .article("https://capital-daily.example/firearms")
        .expect("article persisted");
    assert_eq!(firearms.topics(), ["Public Safety".to_string()]);
    let cabinet = store
        .article("https://prairie-post.example/cabinet")
        .expect("article persisted");
    assert!(cabinet.topics().is_empty(), "{:?}", cabinet.topics());

    assert_eq!(ai.compare_calls(), 0);
    assert_eq!(stats.comparisons_abandoned, 0);
    assert!(store.comparisons().is_empty());
}

#[tokio::test]
async fn page_body_replaces_the_feed_summary() {
    let source = test_source("Hill Desk", Bias::Center, 82);
    let url = "https://hill-desk.example/budget";
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_feed(
                &source.feed_url,
                rss_feed(&[(
                    "Finance minister tables the budget",
                    url,
                    "Short teaser.",
                    OCT_8_10AM,
                )]),
            )
            .on_page(
                url,
                "<html><body><article>\
                 <p>The finance minister tabled the federal budget in the House of Commons.</p>\
                 <p>Opposition critics said the deficit projections were far higher than promised.</p>\
                 <p>The parliamentary budget officer will publish an independent costing next week.</p>\
                 </article></body></html>",
            ),
    );
    let store = Arc::new(MemoryStore::new());

    scout(
        vec![source],
        fetcher,
        Arc::new(MockIntelligence::new()),
        store.clone(),
    )
    .run_cycle()
    .await;

    let article = store.article(url).expect("article persisted");
    let e = article.enrichment.expect("enriched");
    assert_eq!(e.body_origin, BodyOrigin::Page);
    assert_eq!(e.analysis_origin, AnalysisOrigin::Service);
    assert!(e.body.contains("parliamentary budget officer"));
    assert!(!e.body.contains("Short teaser"));
}

#[tokio::test]
async fn analysis_bias_override_drives_spread_and_distribution() {
    let hill = test_source("Hill Times", Bias::Center, 85);
    let desk = test_source("Centre Desk", Bias::Center, 75);
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_feed(
                &hill.feed_url,
                rss_feed(&[(
                    "Bill C-12 budget hearing opens in Ottawa",
                    "https://hill-times.example/c12",
                    "MPs question the finance minister on the budget bill.",
                    OCT_8_10AM,
                )]),
            )
            .on_feed(
                &desk.feed_url,
                rss_feed(&[(
                    "Bill C-12 budget hearing opens amid criticism",
                    "https://centre-desk.example/c12",
                    "Critics slam the budget bill at hearing.",
                    OCT_8_NOON,
                )]),
            ),
    );
    let ai = Arc::new(MockIntelligence::new().with_analysis(
        "Bill C-12 budget hearing opens in Ottawa",
        ArticleAnalysis {
            key_topics: vec!["Federal Budget".into()],
            factuality_score: 80.0,
            emotional_tone: "neutral".into(),
            bias: Some("left".into()),
            ..ArticleAnalysis::default()
        },
    ));
    let store = Arc::new(MemoryStore::new());

    scout(vec![hill, desk], fetcher, ai, store.clone())
        .run_cycle()
        .await;

    let overridden = store
        .article("https://hill-times.example/c12")
        .expect("article persisted");
    assert_eq!(overridden.bias(), Bias::Left);
    assert_eq!(overridden.core.source_bias, Bias::Center);

    let comparison = store.comparison("Federal Budget").expect("comparison persisted");
    assert_eq!(comparison.scores.bias_spread, 50);
    assert_eq!(comparison.scores.diversity, DiversityLabel::HighDiversity);
    assert_eq!(
        comparison.bias_distribution,
        BiasDistribution {
            left: 50,
            center: 50,
            right: 0,
        }
    );
}

#[tokio::test]
async fn scripted_verdict_is_normalized_before_persisting() {
    let (sources, fetcher) = budget_hearing_feeds();
    let ai = Arc::new(MockIntelligence::new().with_verdict(CoverageVerdict {
        consensus_level: 140.0,
        major_discrepancies: vec![
            "Deficit figure differs".into(),
            "  ".into(),
            "deficit figure differs".into(),
        ],
        propaganda_patterns: vec![],
        factual_accuracy: 61.6,
        bias_distribution: Some(ReportedBiasDistribution {
            left: 1.0,
            center: 1.0,
            right: 2.0,
        }),
        manipulation_assessment: "  Mild framing. ".into(),
        public_impact: "High".into(),
    }));
    let store = Arc::new(MemoryStore::new());

    scout(sources, Arc::new(fetcher), ai, store.clone())
        .run_cycle()
        .await;

    let comparison = store.comparison("Federal Budget").expect("comparison persisted");
    assert_eq!(comparison.consensus_level, 100);
    assert_eq!(comparison.factual_accuracy, 62);
    assert_eq!(comparison.discrepancies, vec!["Deficit figure differs".to_string()]);
    assert_eq!(comparison.manipulation_assessment, "Mild framing.");
    assert_eq!(
        comparison.bias_distribution,
        BiasDistribution {
            left: 25,
            center: 25,
            right: 50,
        }
    );
    // 0.4 * 65 + 0.3 * 20 + 0.3 * 62
    assert_eq!(comparison.scores.credibility, 51);
}

#[tokio::test]
async fn rejected_writes_are_persistence_errors() {
    let store = MemoryStore::rejecting();
    let article = Article::bare(ArticleCore {
        url: "https://ledger.example/x".into(),
        title: "Budget vote".into(),
        source_name: "Ledger".into(),
        summary: String::new(),
        published_at: None,
        source_bias: Bias::Center,
        source_credibility: 90,
    });
    let err = store.upsert_article(&article).await.unwrap_err();
    assert!(matches!(err, NewsLensError::Persistence(_)));
    assert!(!err.is_fatal());
}

#[tokio::test(start_paused = true)]
async fn sources_and_articles_are_paced() {
    let sources = vec![
        test_source("First Wire", Bias::Left, 70),
        test_source("Second Wire", Bias::Right, 70),
    ];
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_feed(
                &sources[0].feed_url,
                rss_feed(&[
                    ("Budget vote tonight", "https://first-wire.example/1", "", OCT_8_10AM),
                    ("Senate sits late", "https://first-wire.example/2", "", OCT_8_10AM),
                ]),
            )
            .on_feed(
                &sources[1].feed_url,
                rss_feed(&[
                    ("Tariff talks resume", "https://second-wire.example/1", "", OCT_8_NOON),
                    ("Housing bill tabled", "https://second-wire.example/2", "", OCT_8_NOON),
                ]),
            ),
    );
    let settings = ScoutSettings {
        source_delay: Duration::from_secs(2),
        article_delay: Duration::from_secs(1),
        ..ScoutSettings::unpaced()
    };
    let scout = Scout::new(
        SourceRegistry::new(sources),
        fetcher,
        Arc::new(MockIntelligence::new()),
        Arc::new(MemoryStore::new()),
        settings,
    );

    let started = tokio::time::Instant::now();
    let stats = scout.run_cycle().await;
    let elapsed = started.elapsed();

    assert_eq!(stats.articles_enriched, 4);
    // Per source: one pause between its two articles, then the source pause.
    assert!(elapsed >= Duration::from_secs(6), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(7), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn zero_interval_schedule_still_ticks() {
    let (sources, fetcher) = budget_hearing_feeds();
    let fetcher = Arc::new(fetcher);
    let scout = scout(
        sources,
        fetcher.clone(),
        Arc::new(MockIntelligence::new()),
        Arc::new(MemoryStore::new()),
    );

    let outcome =
        tokio::time::timeout(Duration::from_millis(2500), run_forever(&scout, Duration::ZERO))
            .await;

    assert!(outcome.is_err(), "schedule never returns");
    // Cycles at 0s, 1s and 2s, two feeds each.
    assert_eq!(fetcher.feed_requests(), 6);
}
