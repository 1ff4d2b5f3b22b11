//! Embedded structured data (JSON-LD)
//!
//! Blocks are collected as raw JSON objects first so that block selection can
//! look at `@type` and key presence without committing to a shape. The chosen
//! block is then read into [`StructuredBlock`], where every field that the
//! wild sometimes publishes as a single value and sometimes as a list is a
//! [`OneOrMany`], and any field with an unexpected JSON type is dropped
//! instead of failing the whole block.

use crate::extract::{normalize_whitespace, ExtractError};
use crate::record::ItemRecord;
use regex::Regex;
use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt;

/// Raw JSON-LD object as found on the page
pub type RawBlock = Map<String, Value>;

/// Plausible range for a year taken from structured date fields
const YEAR_RANGE: std::ops::RangeInclusive<i64> = 1000..=2100;

/// A value published either alone or as a list
///
/// `Many` is tried first so a one-element list is never read as a single
/// struct-from-sequence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn first(&self) -> Option<&T> {
        match self {
            Self::Many(values) => values.first(),
            Self::One(value) => Some(value),
        }
    }
}

/// A string or number field, kept in its published textual form
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    /// Reads a year from the value
    ///
    /// Numbers must fall in 1000..=2100. Text is searched for the first
    /// standalone 4-digit group in that range (`"1997-06-26"` gives 1997).
    fn year(&self, pattern: &Regex) -> Option<i32> {
        match self {
            Self::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
                .filter(|year| YEAR_RANGE.contains(year))
                .and_then(|year| i32::try_from(year).ok()),
            Self::Text(text) => pattern
                .find_iter(text)
                .filter_map(|m| m.as_str().parse::<i64>().ok())
                .find(|year| YEAR_RANGE.contains(year))
                .and_then(|year| i32::try_from(year).ok()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{}", number),
        }
    }
}

/// Author published as an object or a bare name
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Name(String),
    Person {
        #[serde(default, deserialize_with = "lenient")]
        name: Option<String>,
    },
}

impl AuthorRef {
    fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Person { name } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRating {
    #[serde(default, deserialize_with = "lenient")]
    pub rating_value: Option<Scalar>,

    #[serde(default, deserialize_with = "lenient")]
    pub rating_count: Option<Scalar>,
}

/// The fields read from the selected JSON-LD block
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredBlock {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<OneOrMany<AuthorRef>>,

    #[serde(default, deserialize_with = "lenient")]
    pub aggregate_rating: Option<AggregateRating>,

    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub isbn: Option<Scalar>,

    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<OneOrMany<String>>,

    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,

    #[serde(rename = "@id", default, deserialize_with = "lenient")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub in_language: Option<OneOrMany<String>>,

    #[serde(default, deserialize_with = "lenient")]
    pub date_published: Option<Scalar>,

    #[serde(default, deserialize_with = "lenient")]
    pub copyright_year: Option<Scalar>,

    #[serde(default, deserialize_with = "lenient")]
    pub publication_date: Option<Scalar>,
}

/// Deserializes a field, turning a type mismatch into `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl StructuredBlock {
    /// Reads the typed view of a raw block
    pub fn from_raw(raw: &RawBlock) -> Self {
        serde_json::from_value(Value::Object(raw.clone())).unwrap_or_default()
    }

    /// Builds a partial record (no identifying URL) from the block
    pub fn to_record(&self) -> ItemRecord {
        let rating = self.aggregate_rating.as_ref();

        ItemRecord {
            title: self.name.as_deref().map(str::trim).unwrap_or_default().to_string(),
            author: self
                .author
                .as_ref()
                .and_then(OneOrMany::first)
                .and_then(AuthorRef::name)
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            rating: scalar_text(rating.and_then(|r| r.rating_value.as_ref())),
            rating_count: scalar_text(rating.and_then(|r| r.rating_count.as_ref())),
            description: self
                .description
                .as_deref()
                .map(normalize_whitespace)
                .unwrap_or_default(),
            isbn: scalar_text(self.isbn.as_ref()),
            image: self
                .image
                .as_ref()
                .and_then(OneOrMany::first)
                .cloned()
                .unwrap_or_default(),
            canonical_url: self
                .url
                .as_deref()
                .filter(|url| !url.is_empty())
                .or(self.id.as_deref())
                .unwrap_or_default()
                .to_string(),
            language: self
                .in_language
                .as_ref()
                .and_then(OneOrMany::first)
                .map(|lang| lang.trim().to_string())
                .unwrap_or_default(),
            ..ItemRecord::default()
        }
    }

    /// First plausible year among the block's date fields
    pub fn published_year(&self, pattern: &Regex) -> Option<i32> {
        [
            &self.date_published,
            &self.copyright_year,
            &self.publication_date,
        ]
        .into_iter()
        .flatten()
        .find_map(|value| value.year(pattern))
    }
}

fn scalar_text(value: Option<&Scalar>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// Finds and parses the JSON-LD script blocks of a page
#[derive(Debug, Clone)]
pub struct JsonLdReader {
    scripts: Selector,
    year: Regex,
}

impl JsonLdReader {
    pub fn new() -> Result<Self, ExtractError> {
        let scripts = Selector::parse(r#"script[type="application/ld+json"]"#)
            .map_err(|e| ExtractError::InvalidSelector(format!("{:?}", e)))?;
        let year = Regex::new(r"\b[0-9]{4}\b")?;
        Ok(Self { scripts, year })
    }

    /// Year pattern used for structured date fields
    pub fn year_pattern(&self) -> &Regex {
        &self.year
    }

    /// Returns every JSON object published in the page's JSON-LD scripts
    ///
    /// List-typed blocks are flattened into their object members. Scripts
    /// that are empty or not valid JSON are skipped.
    pub fn blocks(&self, document: &Html) -> Vec<RawBlock> {
        let mut blocks = Vec::new();

        for script in document.select(&self.scripts) {
            let raw = script.text().collect::<String>();
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(object)) => blocks.push(object),
                Ok(Value::Array(items)) => blocks.extend(items.into_iter().filter_map(|item| {
                    match item {
                        Value::Object(object) => Some(object),
                        _ => None,
                    }
                })),
                Ok(_) => {}
                Err(e) => tracing::debug!("Skipping malformed JSON-LD block: {}", e),
            }
        }

        blocks
    }
}

/// Picks the block describing the page's subject
///
/// Prefers the first block whose `@type` equals `entity_type`
/// (case-insensitive, also inside a type list). Otherwise takes the first
/// block carrying both `aggregateRating` and `author`.
pub fn select_block<'a>(blocks: &'a [RawBlock], entity_type: &str) -> Option<&'a RawBlock> {
    blocks
        .iter()
        .find(|block| type_matches(block.get("@type"), entity_type))
        .or_else(|| {
            blocks.iter().find(|block| {
                block.contains_key("aggregateRating") && block.contains_key("author")
            })
        })
}

fn type_matches(declared: Option<&Value>, entity_type: &str) -> bool {
    match declared {
        Some(Value::String(name)) => name.eq_ignore_ascii_case(entity_type),
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| name.eq_ignore_ascii_case(entity_type)),
        _ => false,
    }
}
