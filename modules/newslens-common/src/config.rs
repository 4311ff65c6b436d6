use std::env;
use std::time::Duration;

use tracing::info;

use crate::error::NewsLensError;

/// Which implementation answers qualitative analysis requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntelligenceProvider {
    /// Anthropic Claude over HTTP.
    Claude,
    /// Deterministic local heuristics; no network.
    Heuristic,
}

impl IntelligenceProvider {
    fn parse(raw: &str) -> Result<Self, NewsLensError> {
        match raw.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Self::Claude),
            "heuristic" | "local" | "offline" => Ok(Self::Heuristic),
            other => Err(NewsLensError::Config(format!(
                "INTELLIGENCE_PROVIDER must be 'claude' or 'heuristic', got '{other}'"
            ))),
        }
    }
}

/// Upper bound on simultaneous source units.
pub const MAX_SOURCE_CONCURRENCY: usize = 4;

/// Longest accepted clustering window (one year).
pub const MAX_CLUSTER_WINDOW_HOURS: i64 = 24 * 365;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_url: String,

    // Intelligence service
    pub intelligence_provider: IntelligenceProvider,
    pub anthropic_api_key: Option<String>,
    pub claude_model: String,
    pub ai_timeout: Duration,

    // Fetching
    pub user_agent: String,
    pub http_timeout: Duration,

    // Pacing
    pub source_delay: Duration,
    pub article_delay: Duration,
    pub max_concurrent_sources: usize,

    // Clustering
    pub cluster_window_hours: i64,

    // Schedule
    pub run_interval: Duration,
}

impl Config {
    /// Load configuration from the environment (and a `.env` file if present).
    ///
    /// Missing storage or intelligence endpoints are fatal: no run may start
    /// without them.
    pub fn from_env() -> Result<Self, NewsLensError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Every value is validated here so a bad
    /// setting fails at startup instead of mid-run.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, NewsLensError> {
        let intelligence_provider = match var("INTELLIGENCE_PROVIDER") {
            Some(raw) => IntelligenceProvider::parse(&raw)?,
            None => IntelligenceProvider::Claude,
        };
        let anthropic_api_key = var("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty());
        if intelligence_provider == IntelligenceProvider::Claude && anthropic_api_key.is_none() {
            return Err(NewsLensError::Config(
                "ANTHROPIC_API_KEY is required when INTELLIGENCE_PROVIDER=claude".into(),
            ));
        }

        let run_interval_hours: u64 = positive(&var, "RUN_INTERVAL_HOURS", 2)?;
        let run_interval_secs = run_interval_hours.checked_mul(3600).ok_or_else(|| {
            NewsLensError::Config(format!(
                "RUN_INTERVAL_HOURS is too large, got {run_interval_hours}"
            ))
        })?;

        let cluster_window_hours: i64 = positive(&var, "CLUSTER_WINDOW_HOURS", 72)?;
        if cluster_window_hours > MAX_CLUSTER_WINDOW_HOURS {
            return Err(NewsLensError::Config(format!(
                "CLUSTER_WINDOW_HOURS must be at most {}, got {}",
                MAX_CLUSTER_WINDOW_HOURS, cluster_window_hours
            )));
        }

        Ok(Self {
            database_url: required(&var, "DATABASE_URL")?,
            intelligence_provider,
            anthropic_api_key,
            claude_model: var("CLAUDE_MODEL")
                .unwrap_or_else(|| "claude-haiku-4-5-20251001".to_string()),
            ai_timeout: Duration::from_secs(positive(&var, "AI_TIMEOUT_SECS", 60)?),
            user_agent: var("USER_AGENT").unwrap_or_else(default_user_agent),
            http_timeout: Duration::from_secs(positive(&var, "HTTP_TIMEOUT_SECS", 15)?),
            source_delay: Duration::from_millis(parsed(&var, "SOURCE_DELAY_MS", 2000)?),
            article_delay: Duration::from_millis(parsed(&var, "ARTICLE_DELAY_MS", 1000)?),
            max_concurrent_sources: parsed::<usize>(&var, "MAX_CONCURRENT_SOURCES", 1)?
                .clamp(1, MAX_SOURCE_CONCURRENCY),
            cluster_window_hours,
            run_interval: Duration::from_secs(run_interval_secs),
        })
    }

    /// Log the effective configuration without secrets.
    pub fn log_redacted(&self) {
        info!(
            database = %redact_url(&self.database_url),
            provider = ?self.intelligence_provider,
            anthropic_key = self.anthropic_api_key.is_some(),
            model = %self.claude_model,
            ai_timeout_secs = self.ai_timeout.as_secs(),
            http_timeout_secs = self.http_timeout.as_secs(),
            source_delay_ms = self.source_delay.as_millis() as u64,
            article_delay_ms = self.article_delay.as_millis() as u64,
            max_concurrent_sources = self.max_concurrent_sources,
            cluster_window_hours = self.cluster_window_hours,
            run_interval_mins = self.run_interval.as_secs() / 60,
            "Configuration loaded"
        );
    }
}

pub fn default_user_agent() -> String {
    format!(
        "newslens/{} (+cross-source news analysis)",
        env!("CARGO_PKG_VERSION")
    )
}

fn required(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, NewsLensError> {
    var(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| NewsLensError::Config(format!("{key} environment variable is required")))
}

fn parsed<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, NewsLensError> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| NewsLensError::Config(format!("{key} must be a number, got '{raw}'"))),
        None => Ok(default),
    }
}

/// Like [`parsed`], but zero and negative values are rejected.
fn positive<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, NewsLensError>
where
    T: std::str::FromStr + PartialOrd + From<u8> + std::fmt::Display,
{
    let value = parsed(var, key, default)?;
    if value < T::from(1) {
        return Err(NewsLensError::Config(format!(
            "{key} must be at least 1, got {value}"
        )));
    }
    Ok(value)
}

/// Hide the password portion of a connection string.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let creds = &url[scheme_end + 3..at];
            let user = creds.split(':').next().unwrap_or("");
            format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..])
        }
        _ => url.to_string(),
    }
}
