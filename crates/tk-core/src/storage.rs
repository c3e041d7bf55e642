//! Storage collaborator interface and the on-disk layout.
//!
//! The calendar engine never touches the filesystem directly; it persists
//! through this trait. The layout is one JSON record per unit:
//!
//! ```text
//! <root>/<year>.json
//! <root>/<year>/<month 02>.json
//! <root>/<year>/<month 02>/<day 02>.json
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from the storage collaborator. A failed read or write is fatal
/// for that one record only; already-loaded records stay intact.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An underlying filesystem error.
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record file exists but does not parse.
    #[error("malformed record at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized.
    #[error("failed to serialize record for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/path-addressed record reader/writer.
///
/// Implementations decide where the bytes live; the engine only depends on
/// this interface so tests can swap in an in-memory store.
pub trait Storage {
    fn file_exists(&self, path: &Path) -> bool;

    fn dir_exists(&self, path: &Path) -> bool;

    /// Stems of the record files directly under `dir`, sorted. An absent
    /// directory is an empty listing, not an error.
    fn list_files(&self, dir: &Path) -> Result<Vec<String>, StorageError>;

    /// Writes one record, creating parent directories as needed.
    fn write<T: Serialize>(&self, path: &Path, record: &T) -> Result<(), StorageError>;

    /// Reads one record. Missing or malformed files are hard errors.
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T, StorageError>;
}

pub(crate) fn year_file(root: &Path, year: i32) -> PathBuf {
    root.join(format!("{year}.json"))
}

pub(crate) fn year_dir(root: &Path, year: i32) -> PathBuf {
    root.join(year.to_string())
}

pub(crate) fn month_file(root: &Path, year: i32, month: u32) -> PathBuf {
    year_dir(root, year).join(format!("{month:02}.json"))
}

pub(crate) fn month_dir(root: &Path, year: i32, month: u32) -> PathBuf {
    year_dir(root, year).join(format!("{month:02}"))
}

pub(crate) fn day_file(root: &Path, year: i32, month: u32, day: u32) -> PathBuf {
    month_dir(root, year, month).join(format!("{day:02}.json"))
}
