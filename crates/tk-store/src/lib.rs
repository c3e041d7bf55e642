//! Filesystem-backed storage for calendar records.
//!
//! Implements the [`Storage`] trait from `tk-core` with one pretty-printed
//! JSON file per record. Paths are chosen by the engine; this crate only
//! moves bytes and reports failures per record, so one unreadable file
//! never takes down records that were already loaded.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use tk_core::{Storage, StorageError};

/// Stores each record as a JSON file, creating parent directories on
/// demand.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl FsStore {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Storage for FsStore {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<String>, StorageError> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut stems = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
            let entry = entry.map_err(|e| io_error(dir, e))?;
            let path = entry.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                stems.push(stem.to_string());
            }
        }
        stems.sort();
        Ok(stems)
    }

    fn write<T: Serialize>(&self, path: &Path, record: &T) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let json = serde_json::to_string_pretty(record).map_err(|source| {
            StorageError::Serialize {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, json).map_err(|e| io_error(path, e))?;
        tracing::trace!(path = %path.display(), "wrote record");
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T, StorageError> {
        let json = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        serde_json::from_str(&json).map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
