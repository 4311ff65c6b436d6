use std::fmt;

/// Counters for one analysis cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub sources_fetched: u32,
    pub sources_failed: u32,
    pub articles_fetched: u32,
    pub articles_enriched: u32,
    pub articles_degraded: u32,
    pub articles_persisted: u32,
    pub clusters: u32,
    pub comparisons_created: u32,
    pub comparisons_single_source: u32,
    pub comparisons_abandoned: u32,
    pub comparisons_persisted: u32,
    pub persistence_failures: u32,
}

impl RunStats {
    pub fn merge(&mut self, other: &RunStats) {
        self.sources_fetched += other.sources_fetched;
        self.sources_failed += other.sources_failed;
        self.articles_fetched += other.articles_fetched;
        self.articles_enriched += other.articles_enriched;
        self.articles_degraded += other.articles_degraded;
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Analysis Run Complete ===")?;
        writeln!(
            f,
            "Sources fetched:        {} ({} failed)",
            self.sources_fetched, self.sources_failed
        )?;
        writeln!(f, "Articles fetched:       {}", self.articles_fetched)?;
        writeln!(
            f,
            "Articles enriched:      {} ({} via local fallback)",
            self.articles_enriched, self.articles_degraded
        )?;
        writeln!(f, "Articles persisted:     {}", self.articles_persisted)?;
        writeln!(f, "Topic clusters:         {}", self.clusters)?;
        writeln!(f, "Comparisons created:    {}", self.comparisons_created)?;
        writeln!(f, "  single-source skips:  {}", self.comparisons_single_source)?;
        writeln!(f, "  abandoned:            {}", self.comparisons_abandoned)?;
        writeln!(f, "Comparisons persisted:  {}", self.comparisons_persisted)?;
        write!(f, "Persistence failures:   {}", self.persistence_failures)
    }
}
