//! Page-storage backend: one JSON file holding a string map.
//!
//! Mirrors browser page-storage semantics.  A `set` that cannot reach disk
//! (quota, permissions) fails with `Unavailable`; a failed or corrupt read
//! degrades to absent so the caller lands logged-out rather than on a
//! partial session; `delete` is best-effort.
//!
//! The map is mutated copy-then-commit: the file is rewritten first and the
//! in-memory map only updated when the write succeeded, so memory never
//! claims a value the disk lost.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::warn;

use crate::error::StoreError;
use crate::SecretStore;

pub struct PageStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl PageStore {
    /// Open the store at `path`.  A missing file starts empty; an unreadable
    /// or corrupt file also starts empty (fail open) with a warning.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let entries = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    warn!(event = "page_store_corrupt", error = %e, "Discarding unreadable page store");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(event = "page_store_unreadable", error = %e, "Starting with empty page store");
                HashMap::new()
            }
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Conventional location under the per-user data directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "mindline", "Mindline")
            .map(|dirs| dirs.data_dir().join("page-store.json"))
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec(entries).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        std::fs::write(&self.path, bytes).map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl SecretStore for PageStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut guard = self.entries.lock();
        let mut next = guard.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut guard = self.entries.lock();
        if guard.remove(key).is_none() {
            return Ok(());
        }
        if let Err(e) = self.persist(&guard) {
            warn!(event = "page_store_delete_failed", key, error = %e, "Delete not flushed to disk");
        }
        Ok(())
    }
}
