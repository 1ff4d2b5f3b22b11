//! Storage module for persisting crawl results
//!
//! This module handles:
//! - Appending item records to a line-delimited JSON file
//! - Appending failures to a tab-separated log
//! - Rebuilding the resume index from a previous run's output

mod jsonl;
mod traits;

pub use jsonl::JsonlStore;
pub use traits::{RecordSink, StorageError, StorageResult};

use serde_json::Value;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

/// Identifying URLs already persisted when the run started
///
/// Built once from the output file and never mutated afterwards; progress
/// during a run shows up only as new lines in the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeIndex {
    urls: HashSet<String>,
}

impl ResumeIndex {
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl FromIterator<String> for ResumeIndex {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

/// Keys that may carry the identifying URL, in order of preference
const URL_KEYS: [&str; 2] = ["book_url", "url"];

/// Identifying URL of one parsed output line
fn line_url(line: &Value) -> Option<&str> {
    URL_KEYS
        .iter()
        .filter_map(|key| line.get(*key).and_then(Value::as_str))
        .find(|url| !url.is_empty())
}

/// Loads the set of identifying URLs from an existing output file
///
/// Each line is parsed on its own. Lines that are not JSON objects, or have
/// no non-empty identifying URL, are skipped. A missing file yields an
/// empty index.
///
/// # Returns
///
/// * `Ok(ResumeIndex)` - URLs present in the output
/// * `Err(StorageError)` - The file exists but could not be read
pub fn load_seen(path: &Path) -> StorageResult<ResumeIndex> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No previous output at {}", path.display());
            return Ok(ResumeIndex::default());
        }
        Err(e) => return Err(e.into()),
    };

    let mut urls = HashSet::new();
    let mut skipped = 0usize;

    for line in BufReader::new(file).split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(value) => {
                if let Some(url) = line_url(&value) {
                    urls.insert(url.to_string());
                }
            }
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(
            "Skipped {} malformed lines in {}",
            skipped,
            path.display()
        );
    }

    Ok(ResumeIndex { urls })
}
