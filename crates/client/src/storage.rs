//! Key-value storage behind the persisted stores.
//!
//! Plays the part `localStorage` plays in a browser: each store writes one
//! JSON document under a fixed key. [`FileStorage`] keeps them as files in
//! the state directory; [`MemoryStorage`] is for tests and ephemeral runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The state directory could not be created.
    #[error("Cannot create state directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing a key failed.
    #[error("I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored document is not valid JSON for its store.
    #[error("Corrupt value under '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Synchronous string storage keyed by name.
pub trait Storage: Send + Sync {
    /// Read the value under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Absent keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// FileStorage
// =============================================================================

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::CreateDir` if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Write then rename so a crash never leaves a half-written document.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value)
            .and_then(|()| std::fs::rename(&tmp, self.path(key)))
            .map_err(|source| StorageError::Io {
                key: key.to_string(),
                source,
            })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-process storage; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("state")).unwrap();

        assert_eq!(storage.get_item("cart-storage").unwrap(), None);
        storage.set_item("cart-storage", r#"{"items":[]}"#).unwrap();
        assert_eq!(
            storage.get_item("cart-storage").unwrap().as_deref(),
            Some(r#"{"items":[]}"#)
        );
        assert!(storage.dir().join("cart-storage.json").exists());

        storage.remove_item("cart-storage").unwrap();
        storage.remove_item("cart-storage").unwrap();
        assert_eq!(storage.get_item("cart-storage").unwrap(), None);
    }

    #[test]
    fn test_memory_storage_overwrites() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "1").unwrap();
        storage.set_item("k", "2").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("2"));
    }
}
