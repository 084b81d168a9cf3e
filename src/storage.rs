//! Local key-value storage.
//!
//! Every piece of persisted state (the note collection, the login flag, the
//! stored credentials) lives under its own string key. `FileStore` keeps one
//! file per key in a data directory; `MemoryStore` keeps everything in a map.
use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use log::{debug, error, info, trace};
use tempfile::NamedTempFile;

use crate::{CnError, Result};

/// Asynchronous string storage addressed by key.
///
/// Writes are last-writer-wins; there is no versioning or merging.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Reads the value under `key`, `None` when nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a key that is not present is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }
}

/// Keys become file names, so only a conservative character set is allowed.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(CnError::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// Stores each key as a file inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory holding one file per key
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        trace!("Reading key {} from {}", key, path.display());

        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No value stored for key {}", key);
                Ok(None)
            }
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                Err(CnError::Io(e))
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let root = self.root.clone();
        let value = value.to_owned();

        tokio::task::spawn_blocking(move || write_atomically(&root, &path, value.as_bytes()))
            .await
            .map_err(|e| CnError::Persistence {
                message: format!("Write task for key {} failed: {}", key, e),
            })??;

        debug!("Stored key {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed key {}", key);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!("Failed to remove {}: {}", path.display(), e);
                Err(CnError::Io(e))
            }
        }
    }
}

/// Writes through a temporary file in the same directory and renames it over
/// the target, so readers see either the old or the new value.
fn write_atomically(dir: &Path, file_path: &Path, bytes: &[u8]) -> Result<()> {
    if !dir.exists() {
        info!("Creating data directory: {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| {
            error!("Failed to create directory {}: {}", dir.display(), e);
            CnError::Io(e)
        })?;
    }

    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Failed to create temporary file: {}", e);
        CnError::Io(e)
    })?;

    temp_file.write_all(bytes).map_err(|e| {
        error!("Failed to write to temporary file: {}", e);
        CnError::Io(e)
    })?;

    temp_file.flush().map_err(|e| {
        error!("Failed to flush temporary file: {}", e);
        CnError::Io(e)
    })?;

    temp_file.persist(file_path).map_err(|e| {
        error!(
            "Failed to persist file {}: {}",
            file_path.display(),
            e.error
        );
        CnError::Io(e.error)
    })?;

    Ok(())
}

/// Keeps values in memory. Useful for tests and for embedding the library
/// without touching the file system.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> Result<T> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CnError::LockAcquisitionFailed {
                message: "Failed to acquire lock on memory store".to_string(),
            })?;
        Ok(f(&mut entries))
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        self.with_entries(|entries| entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("NOTES_V1").is_ok());
        assert!(validate_key("user-credentials").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key("a b").is_err());
    }

    #[tokio::test]
    async fn test_file_store_missing_key_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("data"));

        assert_eq!(store.get("NOTES_V1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_set_get_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("data"));

        store.set("IS_LOGGED_IN", "true").await.unwrap();
        assert_eq!(store.get("IS_LOGGED_IN").await.unwrap().as_deref(), Some("true"));

        store.set("IS_LOGGED_IN", "false").await.unwrap();
        assert_eq!(store.get("IS_LOGGED_IN").await.unwrap().as_deref(), Some("false"));
        assert!(store.root().join("IS_LOGGED_IN").is_file());
    }

    #[tokio::test]
    async fn test_file_store_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        store.set("USER_CREDENTIALS", "{}").await.unwrap();
        store.remove("USER_CREDENTIALS").await.unwrap();
        store.remove("USER_CREDENTIALS").await.unwrap();
        assert_eq!(store.get("USER_CREDENTIALS").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        let err = store.set("../outside", "x").await.unwrap_err();
        assert!(matches!(err, CnError::InvalidKey { .. }));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();

        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
