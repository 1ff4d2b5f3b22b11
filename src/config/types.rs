use crate::crawler::DelayRange;
use serde::Deserialize;

/// Main configuration structure for Listing-Harvest
///
/// Every section and key has a default, so an empty file (or no file at
/// all) describes a complete crawl.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listing: ListingConfig,
    pub fetch: FetchConfig,
    pub politeness: PolitenessConfig,
    pub extract: ExtractConfig,
    pub output: OutputConfig,
}

/// Which listing to walk and how to recognize detail links on it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Base listing URL; the page parameter is appended to it
    pub url: String,

    /// Stop collecting once this many unique detail links are known
    #[serde(rename = "target-count")]
    pub target_count: usize,

    /// Upper bound on listing pages to scan
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Selector for anchors that title an item on a listing page
    #[serde(rename = "link-selector")]
    pub link_selector: String,

    /// Only hrefs starting with this path are treated as detail links
    #[serde(rename = "detail-path-prefix")]
    pub detail_path_prefix: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            url: "https://www.goodreads.com/list/show/1.Best_Books_Ever".to_string(),
            target_count: 500,
            max_pages: 60,
            link_selector: "a.bookTitle".to_string(),
            detail_path_prefix: "/book/show/".to_string(),
        }
    }
}

/// HTTP identity and retry behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Browser-like identity sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    pub accept: String,

    /// Timeout for a single attempt (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Attempts per URL before the fetch is reported as failed
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Pause between failed attempts
    pub backoff: DelayRange,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/122.0 Safari/537.36"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            accept: "text/html,application/xhtml+xml".to_string(),
            timeout_secs: 25,
            max_attempts: 3,
            backoff: DelayRange::from_millis(1000, 2000),
        }
    }
}

/// Deliberate pauses between outbound requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolitenessConfig {
    /// Pause after each listing page that yielded links
    #[serde(rename = "page-delay")]
    pub page_delay: DelayRange,

    /// Pause between detail pages, whether they succeeded or not
    #[serde(rename = "item-delay")]
    pub item_delay: DelayRange,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            page_delay: DelayRange::from_millis(800, 2000),
            item_delay: DelayRange::from_millis(1200, 3000),
        }
    }
}

/// Detail page extraction tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// JSON-LD `@type` that identifies the page's subject (case-insensitive)
    #[serde(rename = "entity-type")]
    pub entity_type: String,

    /// Maximum number of genre labels kept per record
    #[serde(rename = "genre-limit")]
    pub genre_limit: usize,

    /// Shortest HTML description accepted before falling back to meta tags
    #[serde(rename = "min-description-chars")]
    pub min_description_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            entity_type: "Book".to_string(),
            genre_limit: 5,
            min_description_chars: 40,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Line-delimited JSON records, one per crawled item
    #[serde(rename = "records-path")]
    pub records_path: String,

    /// Tab-separated failure log
    #[serde(rename = "failures-path")]
    pub failures_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_path: "data/raw/goodreads_books.jsonl".to_string(),
            failures_path: "data/raw/failed_urls.txt".to_string(),
        }
    }
}
