//! Tiered news summarization helpers
//!
//! The news stage turns an unbounded article feed into a bounded blob:
//! the most recent article is kept verbatim, everything older is compressed
//! by a single summarization call. The record parsing, partitioning, and
//! composition rules live here as pure functions so they can be tested
//! without collaborators.

/// Literal token the query agent is asked to place between articles
pub const ARTICLE_SEPARATOR: &str = "---ARTICLE SEPARATOR---";

/// Substrings that mark a failed retrieval in the query agent's reply
///
/// Matched case-insensitively against the raw text. Known to be brittle
/// against article bodies that happen to contain a marker; a false positive
/// degrades to verbatim pass-through of the retrieval text.
pub const FAILURE_MARKERS: [&str; 2] = ["could not find", "error"];

/// Written to `db_result` when the feed parses to zero articles
pub const NO_NEWS_SENTINEL: &str = "No news available in the database.";

/// Stands in for the older-news summary when only one article exists
pub const NO_OLDER_NEWS_SENTINEL: &str = "No older news.";

/// Written to `db_result` when retrieval or summarization fails outright
pub const NEWS_ERROR_SENTINEL: &str = "Error: could not process news from the database.";

/// The feed split into the two summarization tiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieredArticles {
    /// Newest article, preserved at full fidelity
    pub most_recent: String,
    /// All older articles, blank-line joined, awaiting one summarization call
    pub older: String,
}

/// Check the raw retrieval text for a recognized failure marker
pub fn contains_failure_marker(raw: &str) -> bool {
    let lowered = raw.to_lowercase();
    FAILURE_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Split the raw feed on the separator into trimmed, non-empty segments
pub fn split_articles(raw: &str) -> Vec<String> {
    raw.split(ARTICLE_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Partition articles into the verbatim head and the to-be-summarized tail
///
/// Returns `None` for an empty feed. The input is ordered newest-first, so
/// index 0 is the most recent article.
pub fn partition_articles(articles: Vec<String>) -> Option<TieredArticles> {
    let mut iter = articles.into_iter();
    let most_recent = iter.next()?;
    let older = iter.collect::<Vec<_>>().join("\n\n");
    Some(TieredArticles { most_recent, older })
}

/// Compose the two-section `db_result` block
pub fn compose_db_result(most_recent: &str, older_summary: &str) -> String {
    format!(
        "[Most Recent News (full text)]\n{most_recent}\n\n---\n[Older News Summary]\n{older_summary}"
    )
}
