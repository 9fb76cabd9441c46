//! In-memory storage implementation.

use super::{BoxFuture, SavedIdentity, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, SavedIdentity>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, identity: &SavedIdentity) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let identity = identity.clone();
        Box::pin(async move {
            let mut entries = self.entries.write().map_err(lock_error)?;
            entries.insert(key, identity);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<SavedIdentity>> {
        let key = key.to_string();
        Box::pin(async move {
            let entries = self.entries.read().map_err(lock_error)?;
            entries.get(&key).cloned().ok_or(StorageError::NotFound(key))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut entries = self.entries.write().map_err(lock_error)?;
            entries.remove(&key);
            Ok(())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let entries = self.entries.read().map_err(lock_error)?;
            Ok(entries.contains_key(&key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let identity = SavedIdentity::new("alice", Some("1234".into()));

        block_on(storage.save("player_id", &identity)).unwrap();
        let loaded = block_on(storage.load("player_id")).unwrap();

        assert_eq!(loaded, identity);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        let identity = SavedIdentity::new("bob", None);

        assert!(!block_on(storage.exists("k")).unwrap());
        block_on(storage.save("k", &identity)).unwrap();
        assert!(block_on(storage.exists("k")).unwrap());

        block_on(storage.delete("k")).unwrap();
        assert!(!block_on(storage.exists("k")).unwrap());
        // Deleting again is fine
        block_on(storage.delete("k")).unwrap();
    }
}
