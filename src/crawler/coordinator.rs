//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties everything together:
//! - Loading the resume index from the existing output
//! - Collecting detail links from the listing
//! - Dropping links that are already persisted
//! - Fetching, extracting and appending each remaining link in order
//! - Routing per-link failures to the failure log

use crate::config::Config;
use crate::crawler::{Fetcher, Paginator};
use crate::extract::Extractor;
use crate::output::CrawlSummary;
use crate::record::{FailureEntry, ItemRecord};
use crate::storage::{load_seen, JsonlStore, RecordSink, ResumeIndex};
use crate::HarvestError;
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use url::Url;

/// Main crawler coordinator structure
///
/// Links are processed strictly one at a time, so records are appended in
/// discovery order minus the links that were already persisted.
pub struct Coordinator<S> {
    config: Config,
    fetcher: Fetcher,
    paginator: Paginator,
    extractor: Extractor,
    sink: S,
}

impl Coordinator<JsonlStore> {
    /// Creates a coordinator writing to the configured output files
    pub fn from_config(config: Config) -> Result<Self, HarvestError> {
        let sink = JsonlStore::open(
            Path::new(&config.output.records_path),
            Path::new(&config.output.failures_path),
        )?;
        Self::new(config, sink)
    }
}

impl<S: RecordSink> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// Builds the HTTP client, the listing paginator and the extractor once
    /// for the whole run.
    pub fn new(config: Config, sink: S) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::new(&config.fetch)?;
        let paginator = Paginator::new(&config.listing, config.politeness.page_delay)?;
        let extractor = Extractor::new(config.extract.clone())?;

        Ok(Self {
            config,
            fetcher,
            paginator,
            extractor,
            sink,
        })
    }

    /// Runs one end-to-end crawl
    ///
    /// 1. Load the resume index from the records file
    /// 2. Collect detail links from the listing
    /// 3. Drop links already in the resume index, keeping discovery order
    /// 4. For each remaining link: fetch, extract, append the record, or
    ///    append a failure entry and move on
    /// 5. Pause between links regardless of outcome
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - Counts of crawled and failed links
    /// * `Err(HarvestError)` - The listing could not be read or output could
    ///   not be written
    pub async fn run(&mut self) -> Result<CrawlSummary, HarvestError> {
        let started = Instant::now();
        let mut summary = CrawlSummary::new(Utc::now());

        let resume = load_seen(Path::new(&self.config.output.records_path))?;
        tracing::info!("Already crawled items: {}", resume.len());

        tracing::info!("Collecting detail links from {}", self.config.listing.url);
        let candidates = self
            .paginator
            .collect_links(
                &self.fetcher,
                &self.config.listing.url,
                self.config.listing.target_count,
                self.config.listing.max_pages,
            )
            .await?;
        summary.discovered = candidates.len();

        let todo = pending_links(candidates, &resume);
        summary.resumed = summary.discovered - todo.len();
        tracing::info!(
            "Items to crawl: {} ({} already done)",
            todo.len(),
            summary.resumed
        );

        let total = todo.len();
        for (index, link) in todo.iter().enumerate() {
            match self.process_link(link).await {
                Ok(record) => {
                    self.sink.append_record(&record)?;
                    summary.crawled += 1;
                    tracing::debug!("Saved {}", link);
                }
                Err(e) => {
                    tracing::warn!("Failed {}: {}", link, e);
                    self.sink
                        .append_failure(&FailureEntry::new(link.as_str(), e.to_string()))?;
                    summary.failed += 1;
                }
            }

            let processed = index + 1;
            if processed % 10 == 0 {
                tracing::info!(
                    "Progress: {}/{} items ({} failed)",
                    processed,
                    total,
                    summary.failed
                );
            }

            if processed < total {
                self.config.politeness.item_delay.pause().await;
            }
        }

        summary.elapsed = started.elapsed();
        tracing::info!(
            "Crawl completed: {} crawled, {} failed in {:?}",
            summary.crawled,
            summary.failed,
            summary.elapsed
        );

        Ok(summary)
    }

    /// Fetches and extracts one detail page
    async fn process_link(&self, link: &Url) -> Result<ItemRecord, HarvestError> {
        let html = self.fetcher.fetch(link.as_str()).await?;
        let mut record = self.extractor.extract(&html)?;
        record.url = link.to_string();
        Ok(record)
    }
}

/// Links not yet in the resume index, in discovery order
pub fn pending_links(candidates: Vec<Url>, resume: &ResumeIndex) -> Vec<Url> {
    candidates
        .into_iter()
        .filter(|link| !resume.contains(link.as_str()))
        .collect()
}

/// Runs a crawl writing to the configured output files
///
/// # Example
///
/// ```no_run
/// use listing_harvest::config::Config;
/// use listing_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_crawl(Config::default()).await?;
/// println!("{} crawled, {} failed", summary.crawled, summary.failed);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlSummary, HarvestError> {
    let mut coordinator = Coordinator::from_config(config)?;
    coordinator.run().await
}
