//! Prompt templates for the pipeline's collaborator calls
//!
//! Three templates cover every language-model round trip in a run: the
//! retrieval question handed to the query agent, the older-news
//! summarization request, and the final synthesis prompt.

use crate::error::{ReportError, Result};
use crate::summarize::ARTICLE_SEPARATOR;
use analyst_core::AnalysisState;
use minijinja::{Environment, context};

/// Placeholder embedded in the synthesis prompt for absent state fields
pub const NO_DATA_PLACEHOLDER: &str = "No data available.";

const NEWS_QUERY_TEMPLATE: &str = "\
Give me the 3 most recent news articles about '{{ symbol }}', ordered by news upload time.
Include each article's title and content, and separate the articles with '{{ separator }}'.";

const SUMMARIZATION_TEMPLATE: &str = "\
The following are older news articles. Summarize the key points of each article concisely.

[Articles]
{{ older_news }}

[Summary]
";

const SYNTHESIS_TEMPLATE: &str = "\
You are a Wall Street analyst with 15 years of experience. Synthesize all of the data
provided below into an in-depth research report on the given question. Reason from the
objective data and state a clear final conclusion.

[Question]
{{ question }}

---
[1. Internal Database News (most recent article verbatim + older news summary)]
{{ db_result }}
---
[2. Balance Sheet (most recent 4 quarters)]
{{ balance_sheet }}
---
[3. Income Statement (most recent 4 quarters)]
{{ income_statement }}
---
[4. Cash Flow Statement (most recent 4 quarters)]
{{ cash_flow }}
---

[Research Report]
(Combine all of the information above into an analyst-style report answering the question.)
";

/// The pipeline's prompt templates, compiled once at startup
pub struct PromptSet {
    env: Environment<'static>,
}

impl PromptSet {
    /// Compile the built-in templates
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in [
            ("news_query", NEWS_QUERY_TEMPLATE),
            ("summarization", SUMMARIZATION_TEMPLATE),
            ("synthesis", SYNTHESIS_TEMPLATE),
        ] {
            env.add_template(name, source)
                .map_err(|e| ReportError::Prompt(format!("template '{name}': {e}")))?;
        }
        Ok(Self { env })
    }

    /// Render the retrieval question for the query agent
    pub fn news_query(&self, symbol: &str) -> Result<String> {
        self.render(
            "news_query",
            context! { symbol => symbol, separator => ARTICLE_SEPARATOR },
        )
    }

    /// Render the older-news summarization request
    pub fn summarization(&self, older_news: &str) -> Result<String> {
        self.render("summarization", context! { older_news => older_news })
    }

    /// Render the final synthesis prompt from the accumulated state
    ///
    /// Absent fields are replaced by [`NO_DATA_PLACEHOLDER`] so the model
    /// always sees every labeled section.
    pub fn synthesis(&self, state: &AnalysisState) -> Result<String> {
        let field = |value: &Option<String>| {
            value.clone().unwrap_or_else(|| NO_DATA_PLACEHOLDER.to_string())
        };
        self.render(
            "synthesis",
            context! {
                question => state.question,
                db_result => field(&state.db_result),
                balance_sheet => field(&state.balance_sheet),
                income_statement => field(&state.income_statement),
                cash_flow => field(&state.cash_flow),
            },
        )
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| ReportError::Prompt(format!("template '{name}': {e}")))?;
        template
            .render(ctx)
            .map_err(|e| ReportError::Prompt(format!("render '{name}': {e}")))
    }
}
