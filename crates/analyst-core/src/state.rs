//! Shared pipeline state
//!
//! [`AnalysisState`] is the accumulating record passed between stages. Each
//! field is owned by exactly one stage: a stage reads fields written by
//! earlier stages and writes its own, never the other way around.

use serde::{Deserialize, Serialize};

/// State container flowing through the research pipeline
///
/// One instance exists per run. The workflow engine owns its lifetime and
/// hands it to one stage at a time, so there is no concurrent mutation.
/// Fields start out `None` (or empty) and are filled forward-only:
///
/// - `question` is set at construction and never changes.
/// - `crawled_urls` is append-only, seeded by the ingest pass.
/// - `income_statement` / `balance_sheet` / `cash_flow` are written by the
///   financials stage.
/// - `db_result` is written by the news stage.
/// - `final_answer` is written by the synthesis stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisState {
    /// The subject symbol of the run (e.g. "AAPL")
    pub question: String,

    /// URLs newly crawled into the news store before this run
    pub crawled_urls: Vec<String>,

    /// Composed news block: most recent article verbatim + older summary
    pub db_result: Option<String>,

    /// Income statement text, four most recent quarters
    pub income_statement: Option<String>,

    /// Balance sheet text, four most recent quarters
    pub balance_sheet: Option<String>,

    /// Cash flow statement text, four most recent quarters
    pub cash_flow: Option<String>,

    /// The generated research report
    pub final_answer: Option<String>,
}

impl AnalysisState {
    /// Create the initial state for a run on the given symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            question: symbol.into(),
            ..Self::default()
        }
    }

    /// Append newly crawled URLs, preserving order
    pub fn record_crawled_urls(&mut self, urls: impl IntoIterator<Item = String>) {
        self.crawled_urls.extend(urls);
    }
}
