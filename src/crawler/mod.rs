//! Crawler module for listing traversal and detail page fetching
//!
//! This module contains the core crawling logic, including:
//! - Randomized politeness delays
//! - A reusable retry policy with randomized backoff
//! - HTTP fetching with fixed identity headers
//! - Listing pagination and detail link collection
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod paginator;
mod politeness;
mod retry;

pub use coordinator::{pending_links, run_crawl, Coordinator};
pub use fetcher::{build_http_client, AttemptError, FetchFailure, Fetcher};
pub use paginator::{extract_detail_links, Paginator};
pub use politeness::DelayRange;
pub use retry::{RetryExhausted, RetryPolicy};

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the output and failure files
/// 2. Load the resume index
/// 3. Collect links from the listing
/// 4. Fetch, extract and persist every link not yet crawled
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed; per-item failures are counted
/// * `Err(HarvestError)` - Crawl could not run to completion
pub async fn crawl(config: Config) -> Result<CrawlSummary, HarvestError> {
    run_crawl(config).await
}
