//! Output module for reporting crawl results
//!
//! This module handles:
//! - The end-of-run summary (crawled vs failed counts)
//! - Statistics over an existing output file and failure log

pub mod stats;

pub use stats::{load_statistics, print_statistics, OutputStatistics};

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Counts for one crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub started_at: DateTime<Utc>,

    /// Unique detail links found on the listing
    pub discovered: usize,

    /// Links skipped because they were already in the output
    pub resumed: usize,

    /// Records appended in this run
    pub crawled: usize,

    /// Failure entries appended in this run
    pub failed: usize,

    pub elapsed: Duration,
}

impl CrawlSummary {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            discovered: 0,
            resumed: 0,
            crawled: 0,
            failed: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Links that were actually fetched in this run
    pub fn attempted(&self) -> usize {
        self.crawled + self.failed
    }

    /// Share of attempted links that produced a record, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.crawled as f64 / attempted as f64) * 100.0
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");
    println!(
        "  Started: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Duration: {:.1}s", summary.elapsed.as_secs_f64());
    println!("  Links discovered: {}", summary.discovered);
    println!("  Already crawled (skipped): {}", summary.resumed);
    println!("  Crawled: {}", summary.crawled);
    println!("  Failed: {}", summary.failed);
    println!(
        "  Success rate: {:.1}% ({} / {})",
        summary.success_rate(),
        summary.crawled,
        summary.attempted()
    );
}
