//! Appending access records to the shared output list.
//!
//! Several compiler processes may analyze different files at the same time
//! and append to the same list. Every record is written on its own under an
//! exclusive advisory lock, after repositioning at the end of the file, so
//! lines from different processes never interleave or overwrite each other.

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;
use tracing::warn;

use crate::config::PassConfig;
use crate::model::{AccessKind, AccessRecord, SourceLocation};

/// Interval between lock attempts when the lock wait is bounded.
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Destination for detected accesses.
///
/// Recording never fails from the caller's point of view: a record that
/// cannot be written is reported on the diagnostic stream and dropped.
pub trait AccessSink {
    fn record(&self, location: &SourceLocation, kind: AccessKind);
}

impl<S: AccessSink + ?Sized> AccessSink for &S {
    fn record(&self, location: &SourceLocation, kind: AccessKind) {
        (**self).record(location, kind)
    }
}

/// Error type for a single append to the output list.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to open file \"{path}\": {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to lock the output file: {0}")]
    Lock(io::Error),

    #[error("Timed out after {0:?} waiting for the output file lock")]
    LockTimeout(Duration),

    #[error("Failed to seek to the end of file: {0}")]
    Seek(io::Error),

    #[error("Failed to write the record: {0}")]
    Write(io::Error),
}

/// Appends records to a file shared with other processes.
#[derive(Debug, Clone)]
pub struct FileRecorder {
    path: PathBuf,
    lock_timeout: Option<Duration>,
}

impl FileRecorder {
    /// Recorder that blocks until the file lock is available.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock_timeout: None }
    }

    pub fn from_config(config: &PassConfig) -> Self {
        Self { path: config.output_path.clone(), lock_timeout: config.lock_timeout() }
    }

    /// Give up on a record if the lock is not acquired within `timeout`.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. The file is closed on every path.
    pub fn try_record(&self, record: &AccessRecord) -> Result<(), RecordError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| RecordError::Open { path: self.path.clone(), source })?;

        self.lock(&file)?;
        let written = append_locked(&mut file, record);
        if let Err(err) = FileExt::unlock(&file) {
            // The record (if any) is already in the file.
            warn!(
                path = %self.path.display(),
                "[ma_lines] Failed to unlock the output file: {err}"
            );
        }
        written
    }

    fn lock(&self, file: &File) -> Result<(), RecordError> {
        let Some(timeout) = self.lock_timeout else {
            return file.lock_exclusive().map_err(RecordError::Lock);
        };
        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                    if Instant::now() >= deadline {
                        return Err(RecordError::LockTimeout(timeout));
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(err) => return Err(RecordError::Lock(err)),
            }
        }
    }
}

/// Seek to the end and write the line; the caller holds the lock.
fn append_locked(file: &mut File, record: &AccessRecord) -> Result<(), RecordError> {
    // Another process may have appended between open and lock.
    file.seek(SeekFrom::End(0)).map_err(RecordError::Seek)?;
    file.write_all(record.to_line().as_bytes()).map_err(RecordError::Write)?;
    file.flush().map_err(RecordError::Write)
}

impl AccessSink for FileRecorder {
    fn record(&self, location: &SourceLocation, kind: AccessKind) {
        let Some(record) = AccessRecord::from_location(location, kind) else {
            warn!("[ma_lines] Path to the source file is missing, skipping the statement.");
            return;
        };
        if let Err(err) = self.try_record(&record) {
            warn!(path = %self.path.display(), record = %record, "[ma_lines] {err}");
        }
    }
}

/// Keeps records in memory, in the order they were reported.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AccessRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AccessRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccessSink for MemorySink {
    fn record(&self, location: &SourceLocation, kind: AccessKind) {
        let Some(record) = AccessRecord::from_location(location, kind) else {
            warn!("[ma_lines] Path to the source file is missing, skipping the statement.");
            return;
        };
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}
