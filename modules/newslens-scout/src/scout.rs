use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{debug, error, info};

use newslens_common::{Article, Comparison, Config, Source};

use crate::intelligence::Intelligence;
use crate::pipeline::{
    scoring, Clusterer, Comparator, ComparisonOutcome, CrossSourceVerdict, Enricher, RunStats,
    SourceFetcher, TopicCluster, UnitOutcome,
};
use crate::sources::SourceRegistry;
use crate::traits::{ContentFetcher, NewsStore};

/// Where a cycle currently is. Per-source phases name the source being worked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Fetching { source: String },
    Enriching { source: String },
    Clustering,
    Comparing,
    Scoring,
    Persisting,
}

/// Pacing and grouping knobs for a cycle.
#[derive(Debug, Clone)]
pub struct ScoutSettings {
    /// Pause after each source, before the next one starts.
    pub source_delay: Duration,
    /// Pause between enrichment calls within a source.
    pub article_delay: Duration,
    pub max_concurrent_sources: usize,
    pub cluster_window: chrono::Duration,
}

impl Default for ScoutSettings {
    fn default() -> Self {
        Self {
            source_delay: Duration::from_secs(2),
            article_delay: Duration::from_secs(1),
            max_concurrent_sources: 1,
            cluster_window: chrono::Duration::hours(72),
        }
    }
}

impl ScoutSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_delay: config.source_delay,
            article_delay: config.article_delay,
            max_concurrent_sources: config.max_concurrent_sources,
            cluster_window: chrono::Duration::hours(config.cluster_window_hours),
        }
    }

    /// No pauses. For tests and one-off local runs.
    pub fn unpaced() -> Self {
        Self {
            source_delay: Duration::ZERO,
            article_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Drives one analysis cycle: registry, fetch, enrich, cluster, compare,
/// score, persist. Unit failures are logged and counted, never propagated.
pub struct Scout {
    registry: SourceRegistry,
    fetcher: SourceFetcher,
    enricher: Enricher,
    clusterer: Clusterer,
    comparator: Comparator,
    store: Arc<dyn NewsStore>,
    settings: ScoutSettings,
    phase: watch::Sender<RunPhase>,
}

impl Scout {
    pub fn new(
        registry: SourceRegistry,
        content: Arc<dyn ContentFetcher>,
        intelligence: Arc<dyn Intelligence>,
        store: Arc<dyn NewsStore>,
        settings: ScoutSettings,
    ) -> Self {
        let (phase, _) = watch::channel(RunPhase::Idle);
        Self {
            registry,
            fetcher: SourceFetcher::new(content.clone()),
            enricher: Enricher::new(content, intelligence.clone()),
            clusterer: Clusterer::new(settings.cluster_window),
            comparator: Comparator::new(intelligence),
            store,
            settings,
            phase,
        }
    }

    /// Observe phase transitions.
    pub fn phase(&self) -> watch::Receiver<RunPhase> {
        self.phase.subscribe()
    }

    fn enter(&self, phase: RunPhase) {
        debug!(?phase, "Phase");
        self.phase.send_replace(phase);
    }

    /// Run a full analysis cycle.
    pub async fn run_cycle(&self) -> RunStats {
        let mut stats = RunStats::default();
        info!(sources = self.registry.len(), "Starting analysis cycle");

        let per_source: Vec<(RunStats, Vec<Article>)> = stream::iter(self.registry.all())
            .map(|source| self.process_source(source))
            .buffer_unordered(self.settings.max_concurrent_sources.max(1))
            .collect()
            .await;

        let mut articles = Vec::new();
        for (unit_stats, unit_articles) in per_source {
            stats.merge(&unit_stats);
            articles.extend(unit_articles);
        }

        self.enter(RunPhase::Clustering);
        let clusters = self.clusterer.cluster(&articles);
        stats.clusters = clusters.len() as u32;
        info!(articles = articles.len(), clusters = clusters.len(), "Clustered articles");

        self.enter(RunPhase::Comparing);
        let mut verdicts: Vec<(TopicCluster, CrossSourceVerdict)> = Vec::new();
        for cluster in clusters {
            match self.comparator.compare(&cluster).await {
                ComparisonOutcome::Compared(verdict) => verdicts.push((cluster, verdict)),
                ComparisonOutcome::SingleSource => {
                    debug!(topic = %cluster.topic, "Single-source topic, skipping comparison");
                    stats.comparisons_single_source += 1;
                }
                ComparisonOutcome::Abandoned { reason } => {
                    debug!(topic = %cluster.topic, reason, "Comparison abandoned");
                    stats.comparisons_abandoned += 1;
                }
            }
        }

        self.enter(RunPhase::Scoring);
        let comparisons: Vec<Comparison> = verdicts
            .into_iter()
            .map(|(cluster, verdict)| {
                let refs: Vec<&Article> = cluster.articles.iter().collect();
                let scores = scoring::score_cluster(
                    &refs,
                    verdict.sources.len(),
                    verdict.factual_accuracy as f64,
                );
                verdict.into_comparison(&cluster, scores)
            })
            .collect();
        stats.comparisons_created = comparisons.len() as u32;

        self.enter(RunPhase::Persisting);
        self.persist(&articles, &comparisons, &mut stats).await;

        self.enter(RunPhase::Idle);
        info!("Analysis cycle complete. {stats}");
        stats
    }

    /// Fetch one source and enrich its articles one at a time.
    async fn process_source(&self, source: &Source) -> (RunStats, Vec<Article>) {
        let mut stats = RunStats::default();
        let mut enriched = Vec::new();

        self.enter(RunPhase::Fetching {
            source: source.name.clone(),
        });
        let bare = match self.fetcher.fetch_source(source).await {
            UnitOutcome::Success(articles) | UnitOutcome::Degraded { value: articles, .. } => {
                stats.sources_fetched += 1;
                articles
            }
            UnitOutcome::Failed { reason } => {
                info!(source = %source.name, reason, "Source yielded no articles");
                stats.sources_failed += 1;
                Vec::new()
            }
        };
        stats.articles_fetched = bare.len() as u32;

        if !bare.is_empty() {
            self.enter(RunPhase::Enriching {
                source: source.name.clone(),
            });
        }
        for (i, article) in bare.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.settings.article_delay).await;
            }
            let outcome = self.enricher.enrich(article, source).await;
            if let Some(reason) = outcome.reason() {
                debug!(source = %source.name, reason, "Enrichment degraded");
                stats.articles_degraded += 1;
            }
            if let Some(article) = outcome.into_value() {
                stats.articles_enriched += 1;
                enriched.push(article);
            }
        }

        tokio::time::sleep(self.settings.source_delay).await;
        (stats, enriched)
    }

    async fn persist(
        &self,
        articles: &[Article],
        comparisons: &[Comparison],
        stats: &mut RunStats,
    ) {
        for article in articles {
            match self.store.upsert_article(article).await {
                Ok(()) => stats.articles_persisted += 1,
                Err(e) => {
                    error!(url = article.url(), error = %e, "Failed to persist article");
                    stats.persistence_failures += 1;
                }
            }
        }

        for comparison in comparisons {
            match self.store.upsert_comparison(comparison).await {
                Ok(()) => stats.comparisons_persisted += 1,
                Err(e) => {
                    error!(topic = %comparison.topic, error = %e, "Failed to persist comparison");
                    stats.persistence_failures += 1;
                }
            }
        }
    }
}
