// Postgres persistence for articles and topic comparisons.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use newslens_common::{Article, Comparison, NewsLensError};

use crate::traits::NewsStore;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to Postgres")?;
        Ok(Self::new(pool))
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;
        info!("Database migrations applied");
        Ok(())
    }
}

fn json(value: impl serde::Serialize) -> Result<serde_json::Value, NewsLensError> {
    serde_json::to_value(value).map_err(|e| NewsLensError::Persistence(e.to_string()))
}

#[async_trait]
impl NewsStore for PgStore {
    async fn upsert_article(&self, article: &Article) -> Result<(), NewsLensError> {
        let core = &article.core;
        let e = article.enrichment.as_ref();
        let claims = json(e.map(|e| e.claims.as_slice()).unwrap_or_default())?;

        sqlx::query(
            r#"
            INSERT INTO articles
                (url, title, source_name, summary, published_at, source_bias, source_credibility,
                 bias, techniques, topics, officials, factuality, tone, claims,
                 body, body_origin, analysis_origin, impact_score, analyzed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (url) DO UPDATE SET
                bias            = EXCLUDED.bias,
                techniques      = EXCLUDED.techniques,
                topics          = EXCLUDED.topics,
                officials       = EXCLUDED.officials,
                factuality      = EXCLUDED.factuality,
                tone            = EXCLUDED.tone,
                claims          = EXCLUDED.claims,
                body            = EXCLUDED.body,
                body_origin     = EXCLUDED.body_origin,
                analysis_origin = EXCLUDED.analysis_origin,
                impact_score    = EXCLUDED.impact_score,
                analyzed_at     = EXCLUDED.analyzed_at
            "#,
        )
        .bind(&core.url)
        .bind(&core.title)
        .bind(&core.source_name)
        .bind(&core.summary)
        .bind(core.published_at)
        .bind(core.source_bias.as_str())
        .bind(core.source_credibility as i16)
        .bind(article.bias().as_str())
        .bind(e.map(|e| e.techniques.clone()).unwrap_or_default())
        .bind(e.map(|e| e.topics.clone()).unwrap_or_default())
        .bind(e.map(|e| e.officials.clone()).unwrap_or_default())
        .bind(e.map(|e| e.factuality as i16))
        .bind(e.map(|e| e.tone.as_str()))
        .bind(claims)
        .bind(e.map(|e| e.body.as_str()))
        .bind(e.map(|e| e.body_origin.as_str()))
        .bind(e.map(|e| e.analysis_origin.as_str()))
        .bind(e.map(|e| e.impact_score as i16))
        .bind(e.map(|e| e.analyzed_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            NewsLensError::Persistence(format!("Failed to upsert article {}: {e}", core.url))
        })?;

        Ok(())
    }

    async fn upsert_comparison(&self, c: &Comparison) -> Result<(), NewsLensError> {
        sqlx::query(
            r#"
            INSERT INTO topic_comparisons
                (topic, sources, consensus_level, discrepancies, propaganda_patterns,
                 factual_accuracy, bias_distribution, manipulation_assessment, public_impact,
                 article_count, public_interest_score, credibility_score, bias_spread,
                 diversity, analyzed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (topic) DO UPDATE SET
                consensus_level  = EXCLUDED.consensus_level,
                factual_accuracy = EXCLUDED.factual_accuracy,
                analyzed_at      = EXCLUDED.analyzed_at
            "#,
        )
        .bind(&c.topic)
        .bind(&c.sources)
        .bind(c.consensus_level as i16)
        .bind(json(&c.discrepancies)?)
        .bind(json(&c.propaganda_patterns)?)
        .bind(c.factual_accuracy as i16)
        .bind(json(c.bias_distribution)?)
        .bind(&c.manipulation_assessment)
        .bind(&c.public_impact)
        .bind(c.article_count as i32)
        .bind(c.scores.public_interest as i16)
        .bind(c.scores.credibility as i16)
        .bind(c.scores.bias_spread as i16)
        .bind(c.scores.diversity.to_string())
        .bind(c.analyzed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            NewsLensError::Persistence(format!(
                "Failed to upsert comparison for topic {}: {e}",
                c.topic
            ))
        })?;

        Ok(())
    }
}
