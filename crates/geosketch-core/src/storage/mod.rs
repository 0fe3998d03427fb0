//! Storage abstraction for persisting the feature collection.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use crate::store::PersistedState;
use std::sync::Arc;
use thiserror::Error;

/// Key the feature collection is stored under.
pub const STORAGE_KEY: &str = "gis-features-storage";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for state storage backends.
///
/// Saves are synchronous: the editor persists after every mutation from
/// inside the event handler that made it.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save the full state under `key`, replacing any previous record.
    fn save(&self, key: &str, state: &PersistedState) -> StorageResult<()>;

    /// Load the state stored under `key`.
    fn load(&self, key: &str) -> StorageResult<PersistedState>;

    /// Delete the record under `key`. Missing records are not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if a record exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}

/// Trait for state storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Save the full state under `key`, replacing any previous record.
    fn save(&self, key: &str, state: &PersistedState) -> StorageResult<()>;

    /// Load the state stored under `key`.
    fn load(&self, key: &str) -> StorageResult<PersistedState>;

    /// Delete the record under `key`. Missing records are not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if a record exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}

/// Convenience type alias for platform-specific storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = LocalStorage;

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<PlatformStorage>> {
    Ok(Arc::new(FileStorage::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<PlatformStorage>> {
    Ok(Arc::new(LocalStorage::new()))
}
