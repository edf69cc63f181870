//! Clients for the pipeline's external collaborators

pub mod query;
pub mod yahoo;

pub use query::{HttpQueryAgent, QueryAgent};
pub use yahoo::{FinancialDataSource, FinancialStatements, YahooFundamentalsClient};
