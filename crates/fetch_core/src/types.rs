use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

pub const UNTITLED: &str = "Untitled";
pub const DEFAULT_SOURCE: &str = "web";
pub const SUMMARY_CHARS: usize = 200;
pub const TRUNCATION_MARKER: &str = "...";

/// A normalized article record, keyed by its source `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub source: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Which tier of the cascade produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Primary,
    Fallback,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Primary => "primary",
            Strategy::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cascade-internal output of a single extractor. Never stored directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub strategy_used: Strategy,
}

impl ExtractionResult {
    /// Builds a result whose summary is derived from `content`.
    pub fn new(title: String, content: String, strategy_used: Strategy) -> Self {
        let summary = summarize(&content, SUMMARY_CHARS);
        Self {
            title,
            summary,
            content,
            author: None,
            published_at: None,
            strategy_used,
        }
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    /// Normalizes into the stored shape. `published_at` is left as extracted.
    pub fn into_article(self, url: &str, source: &str) -> Article {
        let title = self.title.trim();
        let title = if title.is_empty() { UNTITLED.to_string() } else { title.to_string() };
        let source = if source.trim().is_empty() { DEFAULT_SOURCE } else { source };

        Article {
            url: url.to_string(),
            title,
            summary: self.summary,
            content: self.content,
            source: source.to_string(),
            author: self.author,
            published_at: self.published_at,
        }
    }
}

/// Derives a summary: the first `limit` chars of `content`, plus
/// [`TRUNCATION_MARKER`] when something was cut off.
pub fn summarize(content: &str, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Stored,
    Duplicate,
}

/// Result of handing an article to the store gateway. For duplicates,
/// `article` is the record that was already stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub status: SaveStatus,
    pub article: Article,
}

impl SaveOutcome {
    pub fn is_duplicate(&self) -> bool {
        self.status == SaveStatus::Duplicate
    }
}

/// Per-URL record of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub url: String,
    pub success: bool,
    pub is_duplicate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn saved(url: &str, outcome: &SaveOutcome) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            is_duplicate: outcome.is_duplicate(),
            title: Some(outcome.article.title.clone()),
            error: None,
        }
    }

    pub fn failed(url: &str, error: &Error) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            is_duplicate: false,
            title: None,
            error: Some(format!("{}: {}", error.kind(), error)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<BatchOutcome>,
    /// Number of URLs the caller submitted.
    pub submitted: usize,
    /// Set when URLs beyond the batch limit were dropped.
    pub truncated: bool,
}

impl BatchResult {
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_short_content_is_unchanged() {
        assert_eq!(summarize("A. B.", SUMMARY_CHARS), "A. B.");
        assert_eq!(summarize("", SUMMARY_CHARS), "");

        let exact = "x".repeat(SUMMARY_CHARS);
        assert_eq!(summarize(&exact, SUMMARY_CHARS), exact);
    }

    #[test]
    fn test_summary_long_content_is_truncated() {
        let content = "y".repeat(SUMMARY_CHARS + 1);
        let summary = summarize(&content, SUMMARY_CHARS);
        assert_eq!(summary.chars().count(), SUMMARY_CHARS + TRUNCATION_MARKER.len());
        assert!(summary.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_summary_counts_chars_not_bytes() {
        let content = "é".repeat(250);
        let summary = summarize(&content, SUMMARY_CHARS);
        assert_eq!(summary, format!("{}...", "é".repeat(200)));
    }

    #[test]
    fn test_into_article_fills_floors() {
        let result = ExtractionResult::new("   ".to_string(), String::new(), Strategy::Fallback);
        let article = result.into_article("https://example.com/a", "");
        assert_eq!(article.title, UNTITLED);
        assert_eq!(article.summary, "");
        assert_eq!(article.source, DEFAULT_SOURCE);
        assert!(article.published_at.is_none());
    }

    #[test]
    fn test_failed_outcome_carries_error() {
        let outcome = BatchOutcome::failed("https://x.test", &Error::Fetch("timed out".into()));
        assert!(!outcome.success);
        assert!(!outcome.is_duplicate);
        assert_eq!(outcome.error.as_deref(), Some("fetch_error: Fetch error: timed out"));
    }

    #[test]
    fn test_strategy_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Strategy::Primary).unwrap(), "\"primary\"");
        assert_eq!(Strategy::Fallback.to_string(), "fallback");
    }
}
