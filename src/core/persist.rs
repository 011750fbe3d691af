//! Whole-file JSON snapshots.
//!
//! Writers go through a temp file in the destination directory that is
//! flushed, synced and renamed over the target, so readers only ever see
//! the previous complete snapshot or the new one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

/// A JSON file that is always replaced wholesale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Bind to a path. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The bound path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Does the file exist?
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Serialize `value` as pretty JSON and atomically replace the file.
    pub fn write<T: Serialize>(&self, value: &T) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec_pretty(value)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }

    /// Read the raw file contents.
    pub fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    /// Remove the file if it exists.
    pub fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Snapshot write errors.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
