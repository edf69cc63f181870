//! Error types for the report pipeline

use thiserror::Error;

/// Report pipeline specific errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// Natural-language query collaborator failed
    #[error("Query agent error: {0}")]
    QueryAgent(String),

    /// Financial statement source failed
    #[error("Financial data error for {symbol}: {reason}")]
    FinancialData { symbol: String, reason: String },

    /// Language model collaborator failed
    #[error("Language model error: {0}")]
    Llm(#[from] analyst_llm::LLMError),

    /// Workflow engine error
    #[error("Workflow error: {0}")]
    Workflow(#[from] analyst_core::Error),

    /// Prompt template rendering failed
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// News ingest failed
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Convert ReportError to the core pipeline error
impl From<ReportError> for analyst_core::Error {
    fn from(err: ReportError) -> Self {
        analyst_core::Error::StageFailed(err.to_string())
    }
}

/// Convert anyhow::Error to ReportError
impl From<anyhow::Error> for ReportError {
    fn from(err: anyhow::Error) -> Self {
        ReportError::Other(err.to_string())
    }
}
