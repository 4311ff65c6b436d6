use std::time::Duration;

use ai_client::util::parse_structured;
use ai_client::{AiError, Claude};
use async_trait::async_trait;
use tracing::debug;

use newslens_common::NewsLensError;

use super::{AnalysisRequest, ArticleAnalysis, ComparisonRequest, CoverageVerdict, Intelligence};

const ANALYST_SYSTEM_PROMPT: &str = "You are a nonpartisan media analyst. You assess news \
coverage for factual reliability, framing, and manipulation techniques. You answer with a \
single JSON object and nothing else.";

/// Claude-backed analysis. One request per call, bounded by the client timeout.
pub struct ClaudeIntelligence {
    claude: Claude,
}

impl ClaudeIntelligence {
    pub fn new(api_key: &str, model: &str, timeout: Duration, user_agent: &str) -> Self {
        Self {
            claude: Claude::new(api_key, model)
                .with_timeout(timeout)
                .with_user_agent(user_agent)
                .with_max_tokens(2048),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.claude = self.claude.with_base_url(url);
        self
    }

    async fn ask<T: serde::de::DeserializeOwned>(&self, prompt: &str) -> Result<T, NewsLensError> {
        let raw = self
            .claude
            .chat_completion(ANALYST_SYSTEM_PROMPT, prompt)
            .await
            .map_err(to_newslens)?;
        debug!(model = self.claude.model(), chars = raw.len(), "Claude answered");
        parse_structured(&raw).map_err(to_newslens)
    }
}

fn to_newslens(e: AiError) -> NewsLensError {
    match e {
        AiError::Parse(msg) => NewsLensError::Parse(msg),
        other => NewsLensError::Intelligence(other.to_string()),
    }
}

#[async_trait]
impl Intelligence for ClaudeIntelligence {
    fn name(&self) -> &str {
        "claude"
    }

    async fn analyze_article(
        &self,
        request: &AnalysisRequest,
    ) -> Result<ArticleAnalysis, NewsLensError> {
        self.ask(&request.prompt).await
    }

    async fn compare_coverage(
        &self,
        request: &ComparisonRequest,
    ) -> Result<CoverageVerdict, NewsLensError> {
        self.ask(&request.prompt).await
    }
}
