//! Detail page extraction
//!
//! Turns one detail page into an [`ItemRecord`] using two tiers:
//!
//! 1. The embedded JSON-LD block describing the page's subject
//! 2. Per-field HTML fallbacks for whatever the block left empty
//!    (description, published year, language) plus the page-text page count
//!
//! Genre tags are always read from the HTML. A field that no tier can
//! resolve is left empty; extraction never guesses.

mod fallback;
mod structured;

pub use fallback::HtmlFallbacks;
pub use structured::{
    select_block, AggregateRating, AuthorRef, JsonLdReader, OneOrMany, RawBlock, Scalar,
    StructuredBlock,
};

use crate::config::ExtractConfig;
use crate::record::ItemRecord;
use scraper::{ElementRef, Html, Node};
use thiserror::Error;

/// Errors that can occur while extracting a detail page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Extracts item records from detail page HTML
///
/// Compiles its selectors and patterns once; reuse one instance per run.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractConfig,
    jsonld: JsonLdReader,
    html: HtmlFallbacks,
}

impl Extractor {
    pub fn new(config: ExtractConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            config,
            jsonld: JsonLdReader::new()?,
            html: HtmlFallbacks::new()?,
        })
    }

    /// Extracts a partial record from a detail page
    ///
    /// The identifying URL is left empty for the caller to fill in.
    ///
    /// # Returns
    ///
    /// * `Ok(ItemRecord)` - Best-effort record, possibly with empty fields
    /// * `Err(ExtractError::EmptyDocument)` - The body has no content at all
    pub fn extract(&self, html: &str) -> Result<ItemRecord, ExtractError> {
        if html.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let document = Html::parse_document(html);
        let blocks = self.jsonld.blocks(&document);
        let block =
            select_block(&blocks, &self.config.entity_type).map(StructuredBlock::from_raw);

        let mut record = match &block {
            Some(block) => block.to_record(),
            None => {
                tracing::debug!("No structured block found, using HTML fallbacks only");
                ItemRecord::default()
            }
        };

        let text = page_text(&document);

        if record.description.is_empty() {
            record.description = self
                .html
                .description(&document, self.config.min_description_chars);
        }

        record.pages = self.html.pages(&text);

        record.published_year = block
            .as_ref()
            .and_then(|block| block.published_year(self.jsonld.year_pattern()))
            .or_else(|| self.html.published_year(&text));

        if record.language.is_empty() {
            record.language = self.html.language(&document, &text);
        }

        record.genres = self.html.genres(&document, self.config.genre_limit);

        Ok(record)
    }
}

/// Collapses every whitespace run to a single space and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of an element with its text nodes joined by spaces
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Visible text of the whole document
///
/// Text inside `script`, `style` and `noscript` is skipped so embedded JSON
/// cannot feed the text heuristics.
pub(crate) fn page_text(document: &Html) -> String {
    let mut parts = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .map(|element| matches!(element.name(), "script" | "style" | "noscript"))
            .unwrap_or(false);
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}
