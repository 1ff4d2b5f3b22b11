//! HTML fallbacks for fields the structured block did not provide
//!
//! Each heuristic is an ordered chain; the first step yielding a non-empty
//! value wins and anything unresolved stays empty.

use crate::extract::{element_text, normalize_whitespace, ExtractError};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Description containers, newer layouts first
const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"[data-testid="description"] .TruncatedContent__text"#,
    r#"[data-testid="description"] .Formatted"#,
    r#"[data-testid="description"] span"#,
    r#"[data-testid="description"]"#,
    ".BookPageMetadataSection__description .TruncatedContent__text",
    ".BookPageMetadataSection__description .Formatted",
    "#description span[style]",
    "#description span",
    "#description",
];

const OG_DESCRIPTION_SELECTOR: &str = r#"meta[property="og:description"]"#;

const DETAILS_ITEM_SELECTOR: &str = ".BookDetails .BookDetails__listItem";

const GENRE_LABEL_SELECTOR: &str = "a.Button.Button--tag span.Button__labelItem";

/// Compiled selectors and patterns for the HTML fallback chains
#[derive(Debug, Clone)]
pub struct HtmlFallbacks {
    description: Vec<Selector>,
    og_description: Selector,
    details_items: Selector,
    genre_labels: Selector,
    published: Regex,
    bare_year: Regex,
    language: Regex,
    pages: Regex,
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector(format!("{}: {:?}", css, e)))
}

impl HtmlFallbacks {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            description: DESCRIPTION_SELECTORS
                .iter()
                .map(|css| selector(css))
                .collect::<Result<_, _>>()?,
            og_description: selector(OG_DESCRIPTION_SELECTOR)?,
            details_items: selector(DETAILS_ITEM_SELECTOR)?,
            genre_labels: selector(GENRE_LABEL_SELECTOR)?,
            published: Regex::new(
                r"(?i)(?:first\s+published|published)\s+(?:.*?\s+)?\b((?:18|19|20)[0-9]{2})\b",
            )?,
            bare_year: Regex::new(r"\b(?:18|19|20)[0-9]{2}\b")?,
            language: Regex::new(
                r"(?i)Language\s*[:\-]?\s*(English|Spanish|French|German|Italian)",
            )?,
            pages: Regex::new(r"(?i)([0-9]+)\s+pages")?,
        })
    }

    /// Description from the page layout
    ///
    /// The first container whose normalized text has at least `min_chars`
    /// characters wins. Otherwise the `og:description` meta content is used
    /// as-is, however short.
    pub fn description(&self, document: &Html, min_chars: usize) -> String {
        for selector in &self.description {
            if let Some(node) = document.select(selector).next() {
                let text = normalize_whitespace(&element_text(&node));
                if text.chars().count() >= min_chars {
                    return text;
                }
            }
        }

        document
            .select(&self.og_description)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map(normalize_whitespace)
            .unwrap_or_default()
    }

    /// Year from the visible page text
    ///
    /// Tries a "published ... YYYY" phrase first, then the first bare
    /// 18xx/19xx/20xx year anywhere.
    pub fn published_year(&self, text: &str) -> Option<i32> {
        if let Some(year) = self
            .published
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
        {
            return Some(year);
        }

        self.bare_year
            .find(text)
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Language from the details list, the page text, then `<html lang>`
    pub fn language(&self, document: &Html, text: &str) -> String {
        for item in document.select(&self.details_items) {
            let item_text = element_text(&item);
            if item_text.trim_start().to_lowercase().starts_with("language") {
                let parts: Vec<&str> = item_text.split_whitespace().collect();
                if parts.len() >= 2 {
                    if let Some(last) = parts.last() {
                        return (*last).to_string();
                    }
                }
            }
        }

        if let Some(name) = self.language.captures(text).and_then(|caps| caps.get(1)) {
            return name.as_str().to_string();
        }

        document
            .root_element()
            .value()
            .attr("lang")
            .map(str::trim)
            .and_then(|lang| lang.split(['-', '_']).next())
            .unwrap_or_default()
            .to_string()
    }

    /// Page count: the first "N pages" in the page text
    pub fn pages(&self, text: &str) -> Option<u32> {
        self.pages
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Genre tag labels, deduplicated in document order, at most `limit`
    pub fn genres(&self, document: &Html, limit: usize) -> Vec<String> {
        let mut seen = HashSet::new();

        document
            .select(&self.genre_labels)
            .map(|label| normalize_whitespace(&element_text(&label)))
            .filter(|label| !label.is_empty())
            .filter(|label| seen.insert(label.clone()))
            .take(limit)
            .collect()
    }
}
