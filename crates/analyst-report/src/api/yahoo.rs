//! Yahoo Finance quoteSummary client for quarterly statements

use crate::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Number of most recent periods fetched per statement
const STATEMENT_PERIODS: usize = 4;

const QUOTE_SUMMARY_MODULES: &str = "incomeStatementHistoryQuarterly,balanceSheetHistoryQuarterly,cashflowStatementHistoryQuarterly";

/// The three statement blobs for one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancialStatements {
    pub income_statement: String,
    pub balance_sheet: String,
    pub cash_flow: String,
}

/// Source of periodic financial statements
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FinancialDataSource: Send + Sync {
    /// Fetch the four most recent quarterly statements for `symbol`,
    /// formatted as text
    async fn fetch_statements(&self, symbol: &str) -> Result<FinancialStatements>;
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<Value>>,
    error: Option<Value>,
}

/// Client for Yahoo Finance's quoteSummary endpoint
pub struct YahooFundamentalsClient {
    client: Client,
    api_base: String,
}

impl YahooFundamentalsClient {
    /// Create a client against the given API base
    /// (e.g. "https://query1.finance.yahoo.com")
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into(),
        })
    }

    async fn fetch_envelope(&self, symbol: &str) -> Result<Value> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}",
            self.api_base, symbol, QUOTE_SUMMARY_MODULES
        );
        debug!(%symbol, "fetching quarterly statements");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ReportError::FinancialData {
                symbol: symbol.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let envelope: QuoteSummaryEnvelope = response.json().await?;
        if let Some(error) = envelope.quote_summary.error {
            if !error.is_null() {
                return Err(ReportError::FinancialData {
                    symbol: symbol.to_string(),
                    reason: error.to_string(),
                });
            }
        }

        envelope
            .quote_summary
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| ReportError::FinancialData {
                symbol: symbol.to_string(),
                reason: "empty quoteSummary result".to_string(),
            })
    }
}

#[async_trait]
impl FinancialDataSource for YahooFundamentalsClient {
    async fn fetch_statements(&self, symbol: &str) -> Result<FinancialStatements> {
        let result = self.fetch_envelope(symbol).await?;

        let income = statement_entries(&result, "incomeStatementHistoryQuarterly", "incomeStatementHistory");
        let balance = statement_entries(&result, "balanceSheetHistoryQuarterly", "balanceSheetStatements");
        let cash = statement_entries(&result, "cashflowStatementHistoryQuarterly", "cashflowStatements");

        Ok(FinancialStatements {
            income_statement: format_statements(income),
            balance_sheet: format_statements(balance),
            cash_flow: format_statements(cash),
        })
    }
}

fn statement_entries<'a>(result: &'a Value, module: &str, list_key: &str) -> &'a [Value] {
    result
        .get(module)
        .and_then(|m| m.get(list_key))
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

/// Render up to [`STATEMENT_PERIODS`] statement entries as labeled text
///
/// Yahoo reports each line item as `{"raw": n, "fmt": "..."}`; the formatted
/// rendition is what the language model gets.
fn format_statements(entries: &[Value]) -> String {
    if entries.is_empty() {
        return "No statement data available.".to_string();
    }

    let mut out = String::new();
    for entry in entries.iter().take(STATEMENT_PERIODS) {
        let period = entry
            .get("endDate")
            .and_then(|d| d.get("fmt"))
            .and_then(Value::as_str)
            .unwrap_or("unknown period");
        out.push_str(&format!("Period ending {period}:\n"));

        if let Some(fields) = entry.as_object() {
            for (name, value) in fields {
                if name == "endDate" || name == "maxAge" {
                    continue;
                }
                let rendered = value
                    .get("longFmt")
                    .or_else(|| value.get("fmt"))
                    .and_then(Value::as_str);
                if let Some(rendered) = rendered {
                    out.push_str(&format!("  {name}: {rendered}\n"));
                }
            }
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_entry(period: &str, revenue: u64) -> Value {
        json!({
            "endDate": {"raw": 1735603200u64, "fmt": period},
            "maxAge": 1,
            "totalRevenue": {"raw": revenue, "fmt": "119.6B", "longFmt": "119,575,000,000"},
            "netIncome": {"raw": 33916000000u64, "fmt": "33.92B", "longFmt": "33,916,000,000"}
        })
    }

    #[test]
    fn test_format_statements_renders_each_period() {
        let entries = vec![sample_entry("2024-12-31", 1), sample_entry("2024-09-30", 2)];
        let text = format_statements(&entries);

        assert!(text.contains("Period ending 2024-12-31:"));
        assert!(text.contains("Period ending 2024-09-30:"));
        assert!(text.contains("totalRevenue: 119,575,000,000"));
        assert!(!text.contains("maxAge"));
    }

    #[test]
    fn test_format_statements_caps_at_four_periods() {
        let entries: Vec<Value> = (0..6).map(|i| sample_entry(&format!("p{i}"), i)).collect();
        let text = format_statements(&entries);
        assert_eq!(text.matches("Period ending").count(), STATEMENT_PERIODS);
    }

    #[test]
    fn test_format_statements_empty() {
        assert_eq!(format_statements(&[]), "No statement data available.");
    }

    #[test]
    fn test_statement_entries_missing_module_is_empty() {
        let result = json!({});
        assert!(statement_entries(&result, "incomeStatementHistoryQuarterly", "incomeStatementHistory").is_empty());
    }

    #[test]
    fn test_envelope_parses_error_body() {
        let raw = r#"{"quoteSummary": {"result": null, "error": {"code": "Not Found"}}}"#;
        let envelope: QuoteSummaryEnvelope = serde_json::from_str(raw).unwrap();
        assert!(envelope.quote_summary.result.is_none());
        assert!(envelope.quote_summary.error.is_some());
    }
}
