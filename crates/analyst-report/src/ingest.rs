//! News ingest and URL deduplication
//!
//! Refreshes the news store before a pipeline run: lists candidate article
//! URLs for a symbol, drops the ones already stored, fetches the remainder,
//! and saves them. Scraping and persistence live behind collaborator traits;
//! only the dedup and timestamp-fallback rules are owned here.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Timestamp format used by the news feed (e.g. "2025-07-31T12:31:00.000Z")
const FEED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// One fetched news article
#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub content: String,
    /// Publish time, best-effort; falls back to ingestion time
    pub published_at: DateTime<Utc>,
    /// Unique within the store
    pub source_url: String,
}

/// Collaborator that lists and scrapes articles for a symbol
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Candidate article URLs, newest first
    async fn list_recent_urls(&self, symbol: &str) -> Result<Vec<String>>;

    /// Fetch the full article behind one URL
    async fn fetch_article(&self, url: &str) -> Result<Article>;
}

/// Collaborator persisting articles into the news store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// URLs already stored for the symbol
    async fn known_urls(&self, symbol: &str) -> Result<HashSet<String>>;

    /// Persist a batch of newly fetched articles
    async fn save_articles(&self, symbol: &str, articles: &[Article]) -> Result<()>;
}

/// Parse a feed timestamp, falling back to ingestion time
pub fn parse_published_at(raw: &str) -> DateTime<Utc> {
    match NaiveDateTime::parse_from_str(raw, FEED_TIME_FORMAT) {
        Ok(naive) => naive.and_utc(),
        Err(e) => {
            warn!(raw, error = %e, "could not parse publish time, using ingestion time");
            Utc::now()
        }
    }
}

/// Drop candidates already known, preserving feed order
///
/// Also drops duplicates within the candidate list itself, so every returned
/// URL is unique.
pub fn filter_unknown(candidates: Vec<String>, known: &HashSet<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    candidates
        .into_iter()
        .filter(|url| !known.contains(url) && seen.insert(url.clone()))
        .collect()
}

/// Refreshes the news store for a symbol ahead of a pipeline run
pub struct IngestService {
    source: Arc<dyn ArticleSource>,
    repository: Arc<dyn NewsRepository>,
}

impl IngestService {
    /// Create the service around the injected collaborators
    pub fn new(source: Arc<dyn ArticleSource>, repository: Arc<dyn NewsRepository>) -> Self {
        Self { source, repository }
    }

    /// Fetch and store articles not yet known; returns the crawled URLs
    ///
    /// A failure on one article is logged and skipped; the rest of the batch
    /// still lands.
    pub async fn refresh(&self, symbol: &str) -> Result<Vec<String>> {
        let known = self.repository.known_urls(symbol).await?;
        let candidates = self.source.list_recent_urls(symbol).await?;
        let fresh = filter_unknown(candidates, &known);

        if fresh.is_empty() {
            info!(symbol, "no new articles to ingest");
            return Ok(Vec::new());
        }

        let mut articles = Vec::with_capacity(fresh.len());
        for url in &fresh {
            match self.source.fetch_article(url).await {
                Ok(article) => articles.push(article),
                Err(e) => warn!(url = %url, error = %e, "skipping article that failed to fetch"),
            }
        }

        if !articles.is_empty() {
            self.repository.save_articles(symbol, &articles).await?;
        }
        info!(symbol, count = articles.len(), "ingested new articles");

        Ok(articles.into_iter().map(|a| a.source_url).collect())
    }
}
