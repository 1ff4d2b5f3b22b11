//! Persisted record types
//!
//! One [`ItemRecord`] per successfully crawled detail page, one
//! [`FailureEntry`] per detail page that could not be fetched or parsed.

use serde::{Deserialize, Serialize};

/// Metadata for one crawled item
///
/// Only `url` is required. Every other field is best effort: empty strings
/// and `None` mean "not found on the page", never a guess.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Canonical detail-page URL; the resume key
    #[serde(rename = "book_url", alias = "url")]
    pub url: String,

    #[serde(default)]
    pub title: String,

    /// First listed author
    #[serde(default)]
    pub author: String,

    /// Aggregate rating value as published by the site
    #[serde(default)]
    pub rating: String,

    #[serde(default)]
    pub rating_count: String,

    /// Whitespace-normalized description
    #[serde(default)]
    pub description: String,

    /// External catalog identifier
    #[serde(default)]
    pub isbn: String,

    /// Cover image reference
    #[serde(default)]
    pub image: String,

    /// URL the structured block declares for itself
    #[serde(rename = "url_from_jsonld", default)]
    pub canonical_url: String,

    /// Language name or primary language subtag
    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub pages: Option<u32>,

    #[serde(default)]
    pub published_year: Option<i32>,

    /// Deduplicated genre labels in document order
    #[serde(default)]
    pub genres: Vec<String>,
}

impl ItemRecord {
    /// Creates an empty record for the given detail URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// A detail page that permanently failed in this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEntry {
    pub url: String,
    pub reason: String,
}

impl FailureEntry {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Formats the entry as one failure-log line (without the newline)
    ///
    /// Tabs and line breaks inside the reason are collapsed to spaces so the
    /// entry always occupies exactly one line with exactly one tab.
    pub fn to_line(&self) -> String {
        let reason: String = self
            .reason
            .chars()
            .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
            .collect();
        format!("{}\t{}", self.url, reason.trim())
    }
}
