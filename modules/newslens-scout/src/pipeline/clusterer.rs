use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::Duration;
use tracing::debug;

use newslens_common::Article;

use crate::pipeline::text::{jaccard, tokens};

/// Title+summary overlap at which two articles are treated as the same story.
pub const NEAR_DUPLICATE_THRESHOLD: f64 = 0.35;

/// Articles sharing a topic label for one run. Never persisted.
#[derive(Debug, Clone)]
pub struct TopicCluster {
    pub topic: String,
    pub articles: Vec<Article>,
}

impl TopicCluster {
    /// Contributing source names in first-seen order.
    pub fn distinct_sources(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.articles
            .iter()
            .filter(|a| seen.insert(a.core.source_name.to_lowercase()))
            .map(|a| a.core.source_name.clone())
            .collect()
    }

    pub fn is_cross_source(&self) -> bool {
        self.distinct_sources().len() >= 2
    }
}

fn topic_key(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Minimal union-find over batch indices.
struct Groups {
    parent: Vec<usize>,
}

impl Groups {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lower index stays root so the lead article is the earliest one.
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

#[derive(Default)]
struct Bucket {
    label: String,
    members: BTreeSet<usize>,
}

pub struct Clusterer {
    window: Duration,
}

impl Clusterer {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Articles within the window of the newest dated article. Undated ones always pass.
    fn in_window<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        let newest = articles.iter().filter_map(|a| a.core.published_at).max();
        articles
            .iter()
            .filter(|a| match (newest, a.core.published_at) {
                (Some(newest), Some(at)) => newest
                    .checked_sub_signed(self.window)
                    .is_none_or(|start| at >= start),
                _ => true,
            })
            .collect()
    }

    /// Group a run's articles by topic label. An article joins one cluster per
    /// label, and near-duplicates join each other's clusters. Near-duplicates
    /// that carry no label at all form a cluster named after the lead title.
    pub fn cluster(&self, articles: &[Article]) -> Vec<TopicCluster> {
        let batch = self.in_window(articles);
        if batch.len() < articles.len() {
            debug!(
                kept = batch.len(),
                dropped = articles.len() - batch.len(),
                "Articles outside the topic window skipped for clustering"
            );
        }

        let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();
        let mut keys_of: Vec<BTreeSet<String>> = vec![BTreeSet::new(); batch.len()];
        for (i, article) in batch.iter().enumerate() {
            for label in article.topics() {
                let key = topic_key(label);
                if key.is_empty() {
                    continue;
                }
                let bucket = buckets.entry(key.clone()).or_insert_with(|| Bucket {
                    label: label.trim().to_string(),
                    ..Default::default()
                });
                bucket.members.insert(i);
                keys_of[i].insert(key);
            }
        }

        let token_sets: Vec<_> = batch
            .iter()
            .map(|a| tokens(&format!("{} {}", a.core.title, a.core.summary)))
            .collect();
        let mut groups = Groups::new(batch.len());
        for i in 0..batch.len() {
            for j in (i + 1)..batch.len() {
                if jaccard(&token_sets[i], &token_sets[j]) >= NEAR_DUPLICATE_THRESHOLD {
                    groups.union(i, j);
                }
            }
        }

        let mut members_of: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..batch.len() {
            members_of.entry(groups.find(i)).or_default().push(i);
        }

        for (lead, members) in members_of.into_iter().filter(|(_, m)| m.len() > 1) {
            let shared: BTreeSet<String> = members
                .iter()
                .flat_map(|&i| keys_of[i].iter().cloned())
                .collect();

            if shared.is_empty() {
                let label = batch[lead].core.title.trim().to_string();
                let bucket = buckets.entry(topic_key(&label)).or_insert_with(|| Bucket {
                    label,
                    ..Default::default()
                });
                bucket.members.extend(members.iter().copied());
                continue;
            }

            for key in shared {
                if let Some(bucket) = buckets.get_mut(&key) {
                    bucket.members.extend(members.iter().copied());
                }
            }
        }

        buckets
            .into_values()
            .map(|bucket| TopicCluster {
                topic: bucket.label,
                articles: bucket
                    .members
                    .into_iter()
                    .map(|i| batch[i].clone())
                    .collect(),
            })
            .collect()
    }
}
