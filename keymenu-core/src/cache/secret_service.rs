//! Secret Service (GNOME Keyring, KWallet) store over D-Bus
//!
//! Items live in a dedicated collection, created on first use, and carry a
//! single lookup attribute holding the record key.

use std::collections::HashMap;

use dbus_secret_service::{Collection, EncryptionType, Error as SsError, SecretService};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

use super::store::SecretStore;

/// Default collection label
pub const DEFAULT_COLLECTION: &str = "keepass-menu";

/// Item attribute holding the lookup key
pub const KEY_ATTRIBUTE: &str = "keymenu:key";

const CONTENT_TYPE: &str = "application/json";

impl From<SsError> for StoreError {
    fn from(err: SsError) -> Self {
        match err {
            SsError::Locked => Self::Locked,
            SsError::Unavailable => Self::Unavailable(err.to_string()),
            other => Self::Service(other.to_string()),
        }
    }
}

/// Secret store backed by the desktop keyring
pub struct SecretServiceStore {
    service: SecretService,
    collection: String,
}

impl SecretServiceStore {
    /// Connects to the session bus Secret Service
    ///
    /// # Arguments
    /// * `collection` - Label of the collection holding the records
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if no Secret Service is running
    pub fn connect(collection: impl Into<String>) -> StoreResult<Self> {
        let service = SecretService::connect(EncryptionType::Dh)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let collection = collection.into();
        debug!(collection = %collection, "Connected to Secret Service");
        Ok(Self {
            service,
            collection,
        })
    }

    /// Connects using the default collection label
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if no Secret Service is running
    pub fn connect_default() -> StoreResult<Self> {
        Self::connect(DEFAULT_COLLECTION)
    }

    /// Returns the collection label
    #[must_use]
    pub fn collection_label(&self) -> &str {
        &self.collection
    }

    /// Finds the collection by label, creating it when missing
    fn collection(&self) -> StoreResult<Collection<'_>> {
        for collection in self.service.get_all_collections()? {
            if collection.get_label()? == self.collection {
                return Ok(collection);
            }
        }
        info!(collection = %self.collection, "Creating keyring collection");
        Ok(self.service.create_collection(&self.collection, "")?)
    }

    /// Returns the collection, failing with `Locked` while it is locked
    fn unlocked_collection(&self) -> StoreResult<Collection<'_>> {
        let collection = self.collection()?;
        if collection.is_locked()? {
            return Err(StoreError::Locked);
        }
        Ok(collection)
    }

    fn attributes(key: &str) -> HashMap<&str, &str> {
        HashMap::from([(KEY_ATTRIBUTE, key)])
    }
}

impl SecretStore for SecretServiceStore {
    fn find(&self, key: &str) -> StoreResult<Vec<Vec<u8>>> {
        let collection = self.unlocked_collection()?;
        let items = collection.search_items(Self::attributes(key))?;
        items
            .iter()
            .map(|item| item.get_secret().map_err(StoreError::from))
            .collect()
    }

    fn put(&self, key: &str, label: &str, secret: &[u8]) -> StoreResult<()> {
        let collection = self.unlocked_collection()?;
        collection.create_item(label, Self::attributes(key), secret, true, CONTENT_TYPE)?;
        debug!(collection = %self.collection, label = %label, "Stored keyring item");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<usize> {
        let collection = self.unlocked_collection()?;
        let items = collection.search_items(Self::attributes(key))?;
        for item in &items {
            item.delete()?;
        }
        Ok(items.len())
    }

    fn unlock(&self) -> StoreResult<()> {
        let collection = self.collection()?;
        if collection.is_locked()? {
            info!(collection = %self.collection, "Unlocking keyring collection");
            collection.unlock()?;
        }
        Ok(())
    }

    fn store_id(&self) -> &'static str {
        "secret-service"
    }
}

impl std::fmt::Debug for SecretServiceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretServiceStore")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}
