//! File-backed telemetry log with FIFO retention.
//!
//! Access is whole-document read-modify-write without locking. Two processes
//! appending at the same time can lose an update (last writer wins).

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::{LoadOutcome, LogRecord, TelemetryLog};
use crate::error::{MementoError, MementoResult};

/// Persisted log of `T` records at a fixed path, capped at `retention`.
///
/// The cap is at least 1, so a freshly appended record is always stored.
#[derive(Debug, Clone)]
pub struct TelemetryStore<T> {
    path: PathBuf,
    retention: usize,
    _record: PhantomData<fn() -> T>,
}

impl<T: LogRecord> TelemetryStore<T> {
    pub fn new(path: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            path: path.into(),
            retention: retention.max(1),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the log.
    ///
    /// A missing file is an empty log. Corrupt or unreadable content is
    /// recovered as an empty log and reported through [`LoadOutcome::Recovered`].
    pub fn load(&self) -> LoadOutcome<T> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return LoadOutcome::Loaded(TelemetryLog::empty());
            }
            Err(e) => return self.recovered(MementoError::Io(e)),
        };

        let parsed = serde_json::from_str(&content).and_then(TelemetryLog::from_document);
        match parsed {
            Ok(log) => LoadOutcome::Loaded(log),
            Err(e) => self.recovered(MementoError::corrupt(&self.path, e.to_string())),
        }
    }

    fn recovered(&self, cause: MementoError) -> LoadOutcome<T> {
        tracing::warn!(
            path = %self.path.display(),
            error = %cause,
            "Telemetry log unreadable, starting from an empty log"
        );
        LoadOutcome::Recovered {
            log: TelemetryLog::empty(),
            cause,
        }
    }

    /// Persist the full log, replacing the previous document.
    ///
    /// The document is written to a sibling temp file and renamed into place
    /// so readers never observe a partial write.
    pub fn save(&self, log: &TelemetryLog<T>) -> MementoResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| MementoError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut content = serde_json::to_string_pretty(&log.to_document()?)?;
        content.push('\n');

        let tmp = self.tmp_path();
        fs::write(&tmp, content)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::debug!(path = %self.path.display(), records = log.len(), "Saved telemetry log");
        Ok(())
    }

    /// Append a record, evicting the oldest entries beyond the retention cap.
    ///
    /// Returns the number of records stored after the append.
    pub fn append(&self, record: T) -> MementoResult<usize> {
        let mut log = self.load().into_log();
        log.records.push(record);

        let evicted = log.trim_to(self.retention);
        if evicted > 0 {
            tracing::debug!(path = %self.path.display(), evicted, "Evicted old telemetry records");
        }

        self.save(&log)?;
        Ok(log.len())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
