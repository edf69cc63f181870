//! Error types for analyst-core

use thiserror::Error;

/// Result type alias for analyst-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for pipeline operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Workflow graph was malformed at build time
    ///
    /// Always fatal before any node executes.
    #[error("workflow configuration error: {0}")]
    Configuration(String),

    /// A stage executor failed while processing the state
    #[error("stage failed: {0}")]
    StageFailed(String),
}
