//! ml_store — durable storage for small secrets
//!
//! A platform-uniform key-value contract for opaque tokens and serialized
//! session records.  Keys are short ASCII identifiers; values are UTF-8
//! strings (JSON for structured data).  This component performs no
//! encryption of its own beyond what the host keychain provides — it
//! transports already-opaque values.
//!
//! Two production backends, selected exactly once at startup via
//! [`StoreConfig`]:
//! - [`PageStore`] — browser-page-storage analogue; one JSON file.  Reads
//!   fail open to absent so a broken store degrades to logged-out, never
//!   into a corrupt partial session.
//! - [`KeychainStore`] — OS keychain entries under a fixed service name.
//!   Assumed durable; errors propagate unchanged.
//!
//! [`MemoryStore`] backs tests and composition-root previews.

pub mod error;
pub mod keychain;
pub mod memory;
pub mod page;

use std::path::PathBuf;

use async_trait::async_trait;

pub use error::StoreError;
pub use keychain::KeychainStore;
pub use memory::MemoryStore;
pub use page::PageStore;

/// Key-value contract shared by all backends.
///
/// All operations are async; these calls are the core's only storage
/// suspension points.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// `Ok(None)` for an absent key.  Backend-specific read failures either
    /// degrade to absent (page) or propagate (keychain); see the backend docs.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deleting an absent key is a no-op success.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// One-shot backend selection, made by the composition root at startup.
/// Call sites hold a `Box<dyn SecretStore>` and never branch on platform.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// Browser-page-storage analogue backed by one JSON file.
    Page { path: PathBuf },
    /// OS keychain entries under `service`.
    Keychain { service: String },
    /// Volatile in-memory store.
    Memory,
}

impl StoreConfig {
    pub fn open(self) -> Result<Box<dyn SecretStore>, StoreError> {
        match self {
            StoreConfig::Page { path } => Ok(Box::new(PageStore::open(path)?)),
            StoreConfig::Keychain { service } => Ok(Box::new(KeychainStore::new(service))),
            StoreConfig::Memory => Ok(Box::new(MemoryStore::new())),
        }
    }
}
