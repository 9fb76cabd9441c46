//! Browser `localStorage` backend for WebAssembly.

use super::{BoxFuture, SavedIdentity, Storage, StorageError, StorageResult};

/// Stores entries as JSON strings in `window.localStorage`.
///
/// Not Send/Sync: browser handles live on the main thread only.
#[derive(Default)]
pub struct LocalStorage {
    /// Prepended to every key.
    prefix: String,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

fn local_storage() -> StorageResult<web_sys::Storage> {
    let window = web_sys::window().ok_or_else(|| StorageError::Other("No window object".to_string()))?;
    window
        .local_storage()
        .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?
        .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))
}

impl Storage for LocalStorage {
    fn save(&self, key: &str, identity: &SavedIdentity) -> BoxFuture<'_, StorageResult<()>> {
        let key = self.key(key);
        let json = identity.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            local_storage()?
                .set_item(&key, &json)
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {:?}", key, e)))
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<SavedIdentity>> {
        let key = self.key(key);
        Box::pin(async move {
            let json = local_storage()?
                .get_item(&key)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {:?}", key, e)))?
                .ok_or_else(|| StorageError::NotFound(key.clone()))?;
            SavedIdentity::from_json(&json)
                .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {}", key, e)))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = self.key(key);
        Box::pin(async move {
            local_storage()?
                .remove_item(&key)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {:?}", key, e)))
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = self.key(key);
        Box::pin(async move {
            let item = local_storage()?
                .get_item(&key)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {:?}", key, e)))?;
            Ok(item.is_some())
        })
    }
}
