//! Configuration for report pipeline runs

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the report pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Model used for final report synthesis
    pub model: String,

    /// Lighter model used for older-news summarization
    pub summary_model: String,

    /// Endpoint of the natural-language query service
    pub query_agent_url: String,

    /// Base URL of the financial statement source
    pub financial_api_base: String,

    /// Per-call request timeout
    pub request_timeout: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1".to_string(),
            summary_model: "gpt-4.1-mini".to_string(),
            query_agent_url: "http://localhost:8080/query".to_string(),
            financial_api_base: "https://query1.finance.yahoo.com".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Override the query agent endpoint from `QUERY_AGENT_URL` when set
    pub fn with_env_query_url(mut self) -> Self {
        if let Ok(url) = std::env::var("QUERY_AGENT_URL") {
            self.query_agent_url = url;
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() || self.summary_model.is_empty() {
            return Err(ReportError::Config(
                "model names must not be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ReportError::Config(
                "request_timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for ReportConfig
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    model: Option<String>,
    summary_model: Option<String>,
    query_agent_url: Option<String>,
    financial_api_base: Option<String>,
    request_timeout: Option<Duration>,
}

impl ReportConfigBuilder {
    /// Set the synthesis model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the summarization model
    pub fn summary_model(mut self, model: impl Into<String>) -> Self {
        self.summary_model = Some(model.into());
        self
    }

    /// Set the query agent endpoint
    pub fn query_agent_url(mut self, url: impl Into<String>) -> Self {
        self.query_agent_url = Some(url.into());
        self
    }

    /// Set the financial statement source base URL
    pub fn financial_api_base(mut self, url: impl Into<String>) -> Self {
        self.financial_api_base = Some(url.into());
        self
    }

    /// Set the per-call request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ReportConfig> {
        let defaults = ReportConfig::default();

        let config = ReportConfig {
            model: self.model.unwrap_or(defaults.model),
            summary_model: self.summary_model.unwrap_or(defaults.summary_model),
            query_agent_url: self.query_agent_url.unwrap_or(defaults.query_agent_url),
            financial_api_base: self
                .financial_api_base
                .unwrap_or(defaults.financial_api_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}
