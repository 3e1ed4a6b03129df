//! Key/value persistence for client state.
//!
//! The storefront keeps two things between runs: the bearer token and the
//! cart snapshot. Both are small strings stored under fixed keys. The
//! [`Storage`] trait abstracts where they live so tests can run in memory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

/// Errors from reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A string key/value store.
///
/// Implementations must be safe to share across tasks. Missing keys read as
/// `None`; removing a missing key is not an error.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// File storage
// =============================================================================

/// One file per key under a data directory.
///
/// Writes go to a temporary sibling and are renamed into place, so a reader
/// never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory values are stored in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

fn io_err(key: &str) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key)(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(io_err(key))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_err(key))?;
        fs::rename(&tmp, &path).map_err(io_err(key))?;
        debug!(key, path = %path.display(), "Persisted value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(key)(e)),
        }
    }
}

// =============================================================================
// In-memory storage
// =============================================================================

/// Volatile storage, for tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(storage: &dyn Storage) {
        assert_eq!(storage.get("tsir.jwt").expect("get"), None);
        storage.set("tsir.jwt", "abc").expect("set");
        assert_eq!(storage.get("tsir.jwt").expect("get").as_deref(), Some("abc"));
        storage.set("tsir.jwt", "def").expect("overwrite");
        assert_eq!(storage.get("tsir.jwt").expect("get").as_deref(), Some("def"));
        storage.remove("tsir.jwt").expect("remove");
        storage.remove("tsir.jwt").expect("remove twice");
        assert_eq!(storage.get("tsir.jwt").expect("get"), None);
    }

    #[test]
    fn test_memory_storage() {
        exercise(&MemoryStorage::new());
    }

    #[test]
    fn test_file_storage_creates_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(tmp.path().join("nested"));
        exercise(&storage);
    }

    #[test]
    fn test_file_storage_survives_new_instance() {
        let tmp = tempfile::tempdir().expect("tempdir");
        FileStorage::new(tmp.path())
            .set("tsir.cart", "[]")
            .expect("set");
        let reopened = FileStorage::new(tmp.path());
        assert_eq!(reopened.get("tsir.cart").expect("get").as_deref(), Some("[]"));
    }

    #[test]
    fn test_key_sanitized_into_file_name() {
        let storage = FileStorage::new("/data");
        assert_eq!(storage.path_for("a/b c"), PathBuf::from("/data/a_b_c.json"));
        assert_eq!(storage.path_for("tsir.cart"), PathBuf::from("/data/tsir.cart.json"));
    }
}
