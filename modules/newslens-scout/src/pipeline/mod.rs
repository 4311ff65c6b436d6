pub mod clusterer;
pub mod comparator;
pub mod enricher;
pub mod fetcher;
pub mod outcome;
pub mod scoring;
pub mod stats;
pub mod text;

pub use clusterer::{Clusterer, TopicCluster};
pub use comparator::{Comparator, ComparisonOutcome, CrossSourceVerdict};
pub use enricher::Enricher;
pub use fetcher::SourceFetcher;
pub use outcome::UnitOutcome;
pub use stats::RunStats;
