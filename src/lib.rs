//! Listing-Harvest: a resumable listing crawler
//!
//! This crate walks a paginated catalog listing, visits every linked detail
//! page, extracts item metadata (embedded JSON-LD first, HTML heuristics
//! second) and appends one JSON record per item to a line-delimited output
//! file. Re-running the crawl skips every item already present in that file.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod record;
pub mod storage;
pub mod url;

use thiserror::Error;

pub use crawler::{AttemptError, FetchFailure};
pub use extract::ExtractError;
pub use storage::StorageError;

/// Main error type for Listing-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid {name} header: {message}")]
    InvalidHeader { name: &'static str, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Listing-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{FailureEntry, ItemRecord};
