//! Natural-language query collaborator
//!
//! The query service owns the text-to-SQL reasoning over the news store; the
//! pipeline only sees a question-in, plain-text-out contract. Failure
//! phrasing inside an otherwise successful reply is recognized downstream by
//! the news stage's marker check.

use crate::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Opaque natural-language query service over the news database
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryAgent: Send + Sync {
    /// Ask one complete natural-language question, get plain text back
    async fn invoke(&self, question: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    question: &'a str,
}

/// HTTP client for a remote query agent deployment
pub struct HttpQueryAgent {
    client: Client,
    endpoint: String,
}

impl HttpQueryAgent {
    /// Create a client for the agent at `endpoint`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl QueryAgent for HttpQueryAgent {
    async fn invoke(&self, question: &str) -> Result<String> {
        debug!(endpoint = %self.endpoint, "sending query agent request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&QueryRequest { question })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReportError::QueryAgent(format!(
                "HTTP {} from query agent",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}
