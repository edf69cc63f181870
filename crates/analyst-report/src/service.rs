//! Report workflow assembly and the caller-facing service

use crate::api::{FinancialDataSource, QueryAgent};
use crate::error::{ReportError, Result};
use crate::ingest::IngestService;
use crate::prompts::PromptSet;
use crate::stages::{FinancialsStage, NewsStage, SynthesisStage};
use analyst_core::AnalysisState;
use analyst_llm::ChatModel;
use analyst_workflow::{CompiledGraph, END, GraphBuilder};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Wire the three pipeline stages into the compiled report workflow
///
/// The wiring is the fixed path `fetch_financials -> fetch_db_news ->
/// generate_answer`; collaborators are injected here, once, and shared by
/// every run streamed off the compiled graph.
pub fn build_report_graph(
    financial_source: Arc<dyn FinancialDataSource>,
    query_agent: Arc<dyn QueryAgent>,
    summarizer: Arc<dyn ChatModel>,
    reporter: Arc<dyn ChatModel>,
    prompts: Arc<PromptSet>,
) -> analyst_core::Result<CompiledGraph<AnalysisState>> {
    info!("assembling report workflow graph");

    GraphBuilder::new()
        .add_node(
            "fetch_financials",
            Arc::new(FinancialsStage::new(financial_source)),
        )
        .add_node(
            "fetch_db_news",
            Arc::new(NewsStage::new(query_agent, summarizer, Arc::clone(&prompts))),
        )
        .add_node("generate_answer", Arc::new(SynthesisStage::new(reporter, prompts)))
        .add_edge("fetch_financials", "fetch_db_news")
        .add_edge("fetch_db_news", "generate_answer")
        .add_edge("generate_answer", END)
        .set_entry_point("fetch_financials")
        .compile()
}

/// Caller-facing surface: one symbol in, one research report out
///
/// Mid-pipeline failures surface as a single generic error; no partial
/// report is ever returned.
pub struct ReportService {
    graph: CompiledGraph<AnalysisState>,
    ingest: Option<IngestService>,
}

impl ReportService {
    /// Create the service over a compiled report graph
    pub fn new(graph: CompiledGraph<AnalysisState>) -> Self {
        Self {
            graph,
            ingest: None,
        }
    }

    /// Refresh the news store before each run
    pub fn with_ingest(mut self, ingest: IngestService) -> Self {
        self.ingest = Some(ingest);
        self
    }

    /// Drive one full analysis run for `symbol` and return the report
    pub async fn analyze(&self, symbol: &str) -> Result<String> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ReportError::Other("symbol must not be empty".to_string()));
        }

        let mut state = AnalysisState::new(&symbol);
        if let Some(ingest) = &self.ingest {
            // Ingest is best-effort; the pipeline runs on whatever the
            // store already holds.
            match ingest.refresh(&symbol).await {
                Ok(urls) => state.record_crawled_urls(urls),
                Err(e) => warn!(symbol = %symbol, error = %e, "continuing without ingest refresh"),
            }
        }

        info!(symbol = %symbol, "starting analysis workflow");
        let mut stream = self.graph.stream(state);
        let mut last = None;
        while let Some(event) = stream.next().await {
            match event {
                Ok((node, updated)) => {
                    info!(node = %node, "workflow node completed");
                    last = Some(updated);
                }
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "analysis workflow failed");
                    return Err(ReportError::Other("analysis failed".to_string()));
                }
            }
        }
        info!(symbol = %symbol, "analysis workflow finished");

        last.and_then(|state| state.final_answer)
            .ok_or_else(|| ReportError::Other("analysis produced no report".to_string()))
    }
}
