//! Key-value backends for persisted application state
//!
//! The conversation store keeps its whole collection in one string slot, so
//! a backend only needs get/set/remove over string keys. Two backends are
//! provided: an in-process map (with an optional byte quota) and an embedded
//! `sled` database on disk.

use crate::error::{Result, SchoolfinderError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// String key-value storage capability injected into the conversation store
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key` in a single write
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing an absent key succeeds
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory backend
///
/// Used by tests and as a scratch store. With a quota set, a write that would
/// grow the total stored bytes (keys plus values) beyond the limit fails
/// with `SchoolfinderError::QuotaExceeded` and leaves the store untouched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an empty store without a quota
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects writes beyond `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| SchoolfinderError::Storage("memory store lock poisoned".into()).into())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;

        if let Some(limit) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let requested = others + key.len() + value.len();
            if requested > limit {
                return Err(SchoolfinderError::QuotaExceeded { limit, requested }.into());
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Durable backend on an embedded `sled` database
pub struct SledStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledStore {
    /// Open or create a database directory at `path`
    ///
    /// # Errors
    ///
    /// Returns `SchoolfinderError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use schoolfinder::storage::SledStore;
    ///
    /// # fn main() -> schoolfinder::error::Result<()> {
    /// let tmp = tempfile::tempdir()?;
    /// let dir = tmp.path().join("store");
    /// let store = SledStore::open(&dir)?;
    /// assert_eq!(store.path(), dir.as_path());
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SchoolfinderError::Storage(format!("Failed to create store directory: {}", e))
            })?;
        }

        let db = sled::open(&path)
            .map_err(|e| SchoolfinderError::Storage(format!("Failed to open database: {}", e)))?;
        tracing::debug!("Opened sled store at {}", path.display());
        Ok(Self { db, path })
    }

    /// Location of the database directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| SchoolfinderError::Storage(format!("Get failed: {}", e)))?;

        match value {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    SchoolfinderError::Storage(format!("Stored value is not UTF-8: {}", e))
                })?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| SchoolfinderError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| SchoolfinderError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| SchoolfinderError::Storage(format!("Remove failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| SchoolfinderError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}
