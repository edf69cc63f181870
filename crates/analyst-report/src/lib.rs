//! Automated equity research report pipeline
//!
//! This crate assembles the domain side of the pipeline:
//!
//! - Three stage executors (financial statements, news + tiered
//!   summarization, report synthesis) over the shared [`AnalysisState`]
//! - The tiered summarization algorithm that bounds an unbounded news feed
//!   to one verbatim article plus one summarized block
//! - Collaborator seams for the NL query agent, the financial statement
//!   source, and the news ingest pair (scraper + store)
//! - [`service::ReportService`], the caller-facing surface: one symbol in,
//!   one research report out
//!
//! # Example
//!
//! ```rust,ignore
//! use analyst_report::{ReportConfig, ReportService, build_report_graph, PromptSet};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ReportConfig::default();
//!     let graph = build_report_graph(source, query, summarizer, reporter, prompts)?;
//!     let service = ReportService::new(graph);
//!
//!     let report = service.analyze("AAPL").await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod prompts;
pub mod service;
pub mod stages;
pub mod summarize;

// Re-export main types for convenience
pub use analyst_core::AnalysisState;
pub use api::{
    FinancialDataSource, FinancialStatements, HttpQueryAgent, QueryAgent,
    YahooFundamentalsClient,
};
pub use config::ReportConfig;
pub use error::{ReportError, Result};
pub use ingest::{Article, ArticleSource, IngestService, NewsRepository};
pub use prompts::PromptSet;
pub use service::{ReportService, build_report_graph};
pub use stages::{FinancialsStage, NewsStage, SynthesisStage};
