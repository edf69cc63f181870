//! Command-line interface for the equity research pipeline

use analyst_llm::{OpenAiChat, OpenAiConfig};
use analyst_report::{
    HttpQueryAgent, PromptSet, ReportConfig, ReportService, YahooFundamentalsClient,
    build_report_graph,
};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "analyst")]
#[command(about = "Generate an equity research report for a stock symbol", long_about = None)]
struct Args {
    /// Stock symbol to analyze (e.g. "AAPL")
    symbol: String,

    /// Override the synthesis model
    #[arg(long)]
    model: Option<String>,

    /// Override the query agent endpoint
    #[arg(long)]
    query_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();
    analyst_utils::init_tracing();

    let args = Args::parse();

    let mut builder = ReportConfig::builder();
    if let Some(model) = args.model {
        builder = builder.model(model);
    }
    if let Some(url) = args.query_url {
        builder = builder.query_agent_url(url);
    }
    let config = builder.build()?.with_env_query_url();

    info!(symbol = %args.symbol, "starting analyst");

    // Collaborators are constructed once and injected explicitly.
    let reporter = Arc::new(OpenAiChat::with_config(OpenAiConfig::from_env(
        config.model.as_str(),
    )?)?);
    let summarizer = Arc::new(OpenAiChat::with_config(OpenAiConfig::from_env(
        config.summary_model.as_str(),
    )?)?);
    let query_agent = Arc::new(HttpQueryAgent::new(
        config.query_agent_url.clone(),
        config.request_timeout,
    )?);
    let financial_source = Arc::new(YahooFundamentalsClient::new(
        config.financial_api_base.clone(),
        config.request_timeout,
    )?);
    let prompts = Arc::new(PromptSet::new()?);

    let graph = build_report_graph(
        financial_source,
        query_agent,
        summarizer,
        reporter,
        prompts,
    )?;
    let service = ReportService::new(graph);

    let report = service.analyze(&args.symbol).await?;

    println!();
    println!("{}", "=".repeat(50));
    println!("[ {} research report ]", args.symbol.to_uppercase());
    println!("{}", "=".repeat(50));
    println!("{report}");
    println!("{}", "=".repeat(50));

    info!("analyst finished");
    Ok(())
}
