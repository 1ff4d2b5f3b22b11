//! Statistics over persisted crawl output
//!
//! Reads the record file and failure log produced by previous runs and
//! reports how many records exist and how well each best-effort field is
//! populated.

use crate::record::ItemRecord;
use crate::storage::StorageResult;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

/// Output file statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputStatistics {
    /// Non-blank lines in the record file
    pub total_lines: u64,

    /// Lines that parsed as records
    pub records: u64,

    pub malformed_lines: u64,

    // Field coverage
    pub with_description: u64,
    pub with_pages: u64,
    pub with_published_year: u64,
    pub with_language: u64,
    pub with_genres: u64,

    /// Entries in the failure log
    pub failures: u64,
}

impl OutputStatistics {
    fn record(&mut self, record: &ItemRecord) {
        self.records += 1;
        if !record.description.is_empty() {
            self.with_description += 1;
        }
        if record.pages.is_some() {
            self.with_pages += 1;
        }
        if record.published_year.is_some() {
            self.with_published_year += 1;
        }
        if !record.language.is_empty() {
            self.with_language += 1;
        }
        if !record.genres.is_empty() {
            self.with_genres += 1;
        }
    }
}

fn open_optional(path: &Path) -> StorageResult<Option<BufReader<File>>> {
    match File::open(path) {
        Ok(file) => Ok(Some(BufReader::new(file))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Loads statistics from the record file and failure log
///
/// Missing files count as empty.
pub fn load_statistics(
    records_path: &Path,
    failures_path: &Path,
) -> StorageResult<OutputStatistics> {
    let mut stats = OutputStatistics::default();

    if let Some(reader) = open_optional(records_path)? {
        for line in reader.split(b'\n') {
            let line = line?;
            let line = String::from_utf8_lossy(&line);
            if line.trim().is_empty() {
                continue;
            }

            stats.total_lines += 1;
            match serde_json::from_str::<ItemRecord>(&line) {
                Ok(record) if !record.url.is_empty() => stats.record(&record),
                _ => stats.malformed_lines += 1,
            }
        }
    }

    if let Some(reader) = open_optional(failures_path)? {
        for line in reader.split(b'\n') {
            if !line?.iter().all(u8::is_ascii_whitespace) {
                stats.failures += 1;
            }
        }
    }

    Ok(stats)
}

fn coverage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &OutputStatistics) {
    println!("=== Output Statistics ===\n");

    println!("Overview:");
    println!("  Records: {}", stats.records);
    println!("  Malformed lines: {}", stats.malformed_lines);
    println!("  Logged failures: {}", stats.failures);
    println!();

    println!("Field Coverage:");
    for (name, count) in [
        ("description", stats.with_description),
        ("pages", stats.with_pages),
        ("published_year", stats.with_published_year),
        ("language", stats.with_language),
        ("genres", stats.with_genres),
    ] {
        println!(
            "  {}: {} ({:.1}%)",
            name,
            count,
            coverage(count, stats.records)
        );
    }
}
