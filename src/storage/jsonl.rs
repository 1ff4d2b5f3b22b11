//! Line-delimited JSON record store with a tab-separated failure log

use crate::record::{FailureEntry, ItemRecord};
use crate::storage::traits::{RecordSink, StorageError, StorageResult};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File-backed [`RecordSink`]
///
/// Both files are opened in append mode. Every record or failure is
/// serialized to a complete line in memory and written with a single
/// `write_all` followed by a flush.
#[derive(Debug)]
pub struct JsonlStore {
    records_path: PathBuf,
    records: File,
    failures_path: PathBuf,
    failures: File,
}

impl JsonlStore {
    /// Opens (creating if needed) the output and failure files
    ///
    /// Missing parent directories are created.
    pub fn open(records_path: &Path, failures_path: &Path) -> StorageResult<Self> {
        Ok(Self {
            records_path: records_path.to_path_buf(),
            records: open_append(records_path)?,
            failures_path: failures_path.to_path_buf(),
            failures: open_append(failures_path)?,
        })
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    pub fn failures_path(&self) -> &Path {
        &self.failures_path
    }
}

fn open_append(path: &Path) -> StorageResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .read(true)
        .create(true)
        .append(true)
        .open(path)?;
    terminate_torn_line(&mut file)?;
    Ok(file)
}

/// Ends a partial last line left by an interrupted write
///
/// The fragment stays in place as one malformed line; the next append then
/// starts on a line of its own.
fn terminate_torn_line(file: &mut File) -> StorageResult<()> {
    if file.metadata()?.len() == 0 {
        return Ok(());
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        tracing::warn!("Terminating partial last line in output file");
        file.write_all(b"\n")?;
        file.flush()?;
    }
    Ok(())
}

fn write_line(file: &mut File, mut line: String) -> StorageResult<()> {
    line.push('\n');
    file.write_all(line.as_bytes())?;
    file.flush()?;
    Ok(())
}

impl RecordSink for JsonlStore {
    fn append_record(&mut self, record: &ItemRecord) -> StorageResult<()> {
        if record.url.trim().is_empty() {
            return Err(StorageError::MissingUrl);
        }
        let line = serde_json::to_string(record)?;
        write_line(&mut self.records, line)
    }

    fn append_failure(&mut self, failure: &FailureEntry) -> StorageResult<()> {
        write_line(&mut self.failures, failure.to_line())
    }
}
