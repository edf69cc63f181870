//! Financial statement fetch stage

use crate::api::FinancialDataSource;
use analyst_core::{AnalysisState, Result, Stage};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// Written to all three statement fields when the source fails
pub const FINANCIALS_ERROR_SENTINEL: &str = "Error: could not fetch financial statements.";

/// Fetches the three quarterly statements for the run's symbol
///
/// A source failure is recovered locally: every statement field gets the
/// same sentinel and the pipeline continues degraded.
pub struct FinancialsStage {
    source: Arc<dyn FinancialDataSource>,
}

impl FinancialsStage {
    /// Create the stage around an injected statement source
    pub fn new(source: Arc<dyn FinancialDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Stage<AnalysisState> for FinancialsStage {
    async fn apply(&self, mut state: AnalysisState) -> Result<AnalysisState> {
        info!(symbol = %state.question, "fetching quarterly financial statements");

        match self.source.fetch_statements(&state.question).await {
            Ok(statements) => {
                state.income_statement = Some(statements.income_statement);
                state.balance_sheet = Some(statements.balance_sheet);
                state.cash_flow = Some(statements.cash_flow);
            }
            Err(e) => {
                error!(symbol = %state.question, error = %e, "financial statement fetch failed");
                state.income_statement = Some(FINANCIALS_ERROR_SENTINEL.to_string());
                state.balance_sheet = Some(FINANCIALS_ERROR_SENTINEL.to_string());
                state.cash_flow = Some(FINANCIALS_ERROR_SENTINEL.to_string());
            }
        }

        Ok(state)
    }

    fn name(&self) -> &str {
        "fetch_financials"
    }
}
