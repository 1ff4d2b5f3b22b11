//! Storage traits and error types
//!
//! This module defines the trait interface for record sinks and
//! associated error types.

use crate::record::{FailureEntry, ItemRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record has no identifying URL")]
    MissingUrl,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only destination for crawl results
///
/// Implementations must never rewrite or remove what they already hold, and
/// each append must land as one complete unit so an interrupted run leaves
/// only whole records behind.
pub trait RecordSink {
    /// Appends one successfully extracted record
    ///
    /// Records without an identifying URL are rejected with
    /// [`StorageError::MissingUrl`].
    fn append_record(&mut self, record: &ItemRecord) -> StorageResult<()>;

    /// Appends one failure entry
    fn append_failure(&mut self, failure: &FailureEntry) -> StorageResult<()>;
}
