//! Browser `localStorage` implementation for WebAssembly.

use super::{Storage, StorageError, StorageResult};
use crate::store::PersistedState;
use wasm_bindgen::JsValue;

/// `localStorage`-backed storage.
///
/// Reads and writes are synchronous, which matches the editor's
/// persist-on-every-mutation contract.
#[derive(Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage(&self) -> StorageResult<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))
    }
}

fn js_error(e: JsValue) -> StorageError {
    StorageError::Other(format!("localStorage error: {:?}", e))
}

impl Storage for LocalStorage {
    fn save(&self, key: &str, state: &PersistedState) -> StorageResult<()> {
        let json = state
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage()?.set_item(key, &json).map_err(js_error)
    }

    fn load(&self, key: &str) -> StorageResult<PersistedState> {
        let json = self
            .storage()?
            .get_item(key)
            .map_err(js_error)?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        PersistedState::from_json(&json).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.storage()?.remove_item(key).map_err(js_error)
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.storage()?.get_item(key).map_err(js_error)?.is_some())
    }
}
