//! Final report synthesis stage

use crate::prompts::PromptSet;
use analyst_core::{AnalysisState, Result, Stage};
use analyst_llm::ChatModel;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Composes one prompt from the accumulated state and generates the report
///
/// Unlike the fetch stages, there is no sentinel fallback here: without a
/// generated answer there is no report to return, so any failure propagates
/// and aborts the run.
pub struct SynthesisStage {
    model: Arc<dyn ChatModel>,
    prompts: Arc<PromptSet>,
}

impl SynthesisStage {
    /// Create the stage around the injected full-size model
    pub fn new(model: Arc<dyn ChatModel>, prompts: Arc<PromptSet>) -> Self {
        Self { model, prompts }
    }
}

#[async_trait]
impl Stage<AnalysisState> for SynthesisStage {
    async fn apply(&self, mut state: AnalysisState) -> Result<AnalysisState> {
        info!(symbol = %state.question, "generating final research report");

        let prompt = self.prompts.synthesis(&state).map_err(analyst_core::Error::from)?;
        let answer = self
            .model
            .invoke(&prompt)
            .await
            .map_err(crate::error::ReportError::from)
            .map_err(analyst_core::Error::from)?;

        state.final_answer = Some(answer);
        info!(symbol = %state.question, "final research report generated");
        Ok(state)
    }

    fn name(&self) -> &str {
        "generate_answer"
    }
}
