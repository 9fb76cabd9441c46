//! Remembers who the local player is across restarts.

use crate::storage::{SavedIdentity, Storage, StorageError, StorageResult};
use std::sync::Arc;

/// Key under which the last identity is kept.
pub const IDENTITY_KEY: &str = "player_id";

/// Saves and restores the player's identity through a storage backend.
pub struct IdentityManager<S: Storage> {
    storage: Arc<S>,
    current: Option<SavedIdentity>,
}

impl<S: Storage> IdentityManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage, current: None }
    }

    /// The identity last remembered or restored.
    pub fn current(&self) -> Option<&SavedIdentity> {
        self.current.as_ref()
    }

    /// Persist the player id, and the game they are in if any.
    pub async fn remember(&mut self, player_id: &str, game_id: Option<&str>) -> StorageResult<()> {
        let identity = SavedIdentity::new(player_id, game_id.map(str::to_string));
        self.storage.save(IDENTITY_KEY, &identity).await?;
        log::debug!("Remembered identity {:?}", identity);
        self.current = Some(identity);
        Ok(())
    }

    /// Load the saved identity. A missing or unreadable entry yields `None`.
    pub async fn restore(&mut self) -> Option<SavedIdentity> {
        match self.storage.load(IDENTITY_KEY).await {
            Ok(identity) => {
                log::info!("Restored identity for {}", identity.player_id);
                self.current = Some(identity.clone());
                Some(identity)
            }
            Err(StorageError::NotFound(_)) => None,
            Err(e) => {
                log::warn!("Ignoring saved identity: {}", e);
                None
            }
        }
    }

    /// Drop the saved identity.
    pub async fn forget(&mut self) -> StorageResult<()> {
        self.current = None;
        self.storage.delete(IDENTITY_KEY).await
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::LocalStorage>> {
    Ok(Arc::new(crate::storage::LocalStorage::new()))
}

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = crate::storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = crate::storage::LocalStorage;

pub type PlatformIdentityManager = IdentityManager<PlatformStorage>;

/// Convenience function to create an identity manager with default storage.
pub fn create_identity_manager() -> StorageResult<PlatformIdentityManager> {
    Ok(IdentityManager::new(create_default_storage()?))
}
