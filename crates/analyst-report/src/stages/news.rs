//! News retrieval and tiered summarization stage

use crate::api::QueryAgent;
use crate::error::Result as ReportResult;
use crate::prompts::PromptSet;
use crate::summarize::{
    NEWS_ERROR_SENTINEL, NO_NEWS_SENTINEL, NO_OLDER_NEWS_SENTINEL, compose_db_result,
    contains_failure_marker, partition_articles, split_articles,
};
use analyst_core::{AnalysisState, Result, Stage};
use analyst_llm::ChatModel;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Retrieves recent news and condenses it into a bounded `db_result` blob
///
/// One retrieval round trip to the query agent, then at most one
/// summarization round trip to the lightweight model regardless of article
/// count. All failures are recovered locally; this stage never aborts a run.
pub struct NewsStage {
    query: Arc<dyn QueryAgent>,
    summarizer: Arc<dyn ChatModel>,
    prompts: Arc<PromptSet>,
}

impl NewsStage {
    /// Create the stage around the injected collaborators
    pub fn new(
        query: Arc<dyn QueryAgent>,
        summarizer: Arc<dyn ChatModel>,
        prompts: Arc<PromptSet>,
    ) -> Self {
        Self {
            query,
            summarizer,
            prompts,
        }
    }

    /// Run retrieval, partitioning, and (at most) one summarization call
    async fn fetch_and_condense(&self, symbol: &str) -> ReportResult<String> {
        let question = self.prompts.news_query(symbol)?;
        let raw = self.query.invoke(&question).await?;
        debug!(length = raw.len(), "raw news retrieval result");

        // Empty or marker-flagged replies pass through verbatim; the
        // synthesis prompt carries whatever the agent had to say.
        if raw.trim().is_empty() || contains_failure_marker(&raw) {
            warn!(symbol, "query agent returned no usable news");
            return Ok(raw);
        }

        let articles = split_articles(&raw);
        let Some(tiers) = partition_articles(articles) else {
            return Ok(NO_NEWS_SENTINEL.to_string());
        };

        let older_summary = if tiers.older.is_empty() {
            NO_OLDER_NEWS_SENTINEL.to_string()
        } else {
            info!(symbol, "summarizing older news articles");
            let prompt = self.prompts.summarization(&tiers.older)?;
            self.summarizer.invoke(&prompt).await?
        };

        Ok(compose_db_result(&tiers.most_recent, &older_summary))
    }
}

#[async_trait]
impl Stage<AnalysisState> for NewsStage {
    async fn apply(&self, mut state: AnalysisState) -> Result<AnalysisState> {
        info!(symbol = %state.question, "fetching news from the database");

        let db_result = match self.fetch_and_condense(&state.question).await {
            Ok(text) => text,
            Err(e) => {
                error!(symbol = %state.question, error = %e, "news processing failed");
                NEWS_ERROR_SENTINEL.to_string()
            }
        };

        state.db_result = Some(db_result);
        Ok(state)
    }

    fn name(&self) -> &str {
        "fetch_db_news"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::MockQueryAgent;
    use crate::summarize::ARTICLE_SEPARATOR;
    use analyst_llm::LLMError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hand-rolled summarizer stub that records every prompt it receives
    struct StubSummarizer {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        reply: analyst_llm::Result<&'static str>,
    }

    impl StubSummarizer {
        fn replying(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                reply: Ok(reply),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                reply: Err(LLMError::RequestFailed("summarizer down".to_string())),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for StubSummarizer {
        async fn invoke(&self, prompt: &str) -> analyst_llm::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok((*text).to_string()),
                Err(e) => Err(LLMError::RequestFailed(e.to_string())),
            }
        }

        fn name(&self) -> &str {
            "stub-summarizer"
        }
    }

    fn query_replying(reply: impl Into<String>) -> Arc<MockQueryAgent> {
        let reply = reply.into();
        let mut agent = MockQueryAgent::new();
        agent.expect_invoke().returning(move |_| Ok(reply.clone()));
        Arc::new(agent)
    }

    fn stage(query: Arc<MockQueryAgent>, summarizer: Arc<StubSummarizer>) -> NewsStage {
        NewsStage::new(query, summarizer, Arc::new(PromptSet::new().unwrap()))
    }

    #[tokio::test]
    async fn test_single_article_skips_summarization() {
        let summarizer = StubSummarizer::replying("unused");
        let stage = stage(query_replying("Only article\nwith a body"), summarizer.clone());

        let state = stage.apply(AnalysisState::new("AAPL")).await.unwrap();
        let db_result = state.db_result.unwrap();

        assert!(db_result.contains("Only article"));
        assert!(db_result.contains(NO_OLDER_NEWS_SENTINEL));
        assert_eq!(summarizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_marker_passes_raw_result_through_verbatim() {
        let raw = "Error: the news table could not be queried";
        let summarizer = StubSummarizer::replying("unused");
        let stage = stage(query_replying(raw), summarizer.clone());

        let state = stage.apply(AnalysisState::new("AAPL")).await.unwrap();

        assert_eq!(state.db_result.as_deref(), Some(raw));
        assert_eq!(summarizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_result_passes_through_verbatim() {
        let summarizer = StubSummarizer::replying("unused");
        let stage = stage(query_replying("   "), summarizer.clone());

        let state = stage.apply(AnalysisState::new("AAPL")).await.unwrap();

        assert_eq!(state.db_result.as_deref(), Some("   "));
        assert_eq!(summarizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_three_articles_summarize_older_tier_in_one_call() {
        let raw = format!(
            "Newest title\nnewest body\n{ARTICLE_SEPARATOR}\nMiddle title\nmiddle body\n{ARTICLE_SEPARATOR}\nOldest title\noldest body"
        );
        let summarizer = StubSummarizer::replying("condensed older news");
        let stage = stage(query_replying(raw), summarizer.clone());

        let state = stage.apply(AnalysisState::new("AAPL")).await.unwrap();
        let db_result = state.db_result.unwrap();

        // Most recent article kept verbatim, older tier replaced by summary.
        assert!(db_result.contains("Newest title\nnewest body"));
        assert!(db_result.contains("condensed older news"));
        assert!(!db_result.contains("middle body"));
        assert_eq!(summarizer.call_count(), 1);

        // The single summarization prompt covers the whole older block.
        let prompts = summarizer.prompts.lock().unwrap();
        assert!(prompts[0].contains("Middle title"));
        assert!(prompts[0].contains("Oldest title"));
    }

    #[tokio::test]
    async fn test_query_failure_substitutes_error_sentinel() {
        let mut agent = MockQueryAgent::new();
        agent.expect_invoke().returning(|_| {
            Err(crate::error::ReportError::QueryAgent("connection refused".to_string()))
        });
        let summarizer = StubSummarizer::replying("unused");
        let stage = stage(Arc::new(agent), summarizer.clone());

        let state = stage.apply(AnalysisState::new("AAPL")).await.unwrap();

        assert_eq!(state.db_result.as_deref(), Some(NEWS_ERROR_SENTINEL));
        assert_eq!(summarizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_summarizer_failure_substitutes_error_sentinel() {
        let raw = format!("Newest\n{ARTICLE_SEPARATOR}\nOlder");
        let summarizer = StubSummarizer::failing();
        let stage = stage(query_replying(raw), summarizer.clone());

        let state = stage.apply(AnalysisState::new("AAPL")).await.unwrap();

        assert_eq!(state.db_result.as_deref(), Some(NEWS_ERROR_SENTINEL));
        assert_eq!(summarizer.call_count(), 1);
    }
}
