//! Keyring cache for database credentials
//!
//! Each database has at most one record, stored under the hex SHA-256 digest
//! of its path. Every store operation that finds the store locked unlocks it
//! once and tries again once; the second outcome is returned as is.

mod secret_service;
mod store;

use std::path::Path;

use ring::digest::{digest, SHA256};
use tracing::{debug, info, warn};

use crate::error::{CacheResult, StoreError, StoreResult};
use crate::models::{CacheRecord, Credential};

pub use secret_service::{SecretServiceStore, DEFAULT_COLLECTION, KEY_ATTRIBUTE};
pub use store::{MemoryStore, SecretStore};

/// Returns the lookup key of a database: lowercase hex SHA-256 of its path
#[must_use]
pub fn lookup_key(database: &Path) -> String {
    let path = database.to_string_lossy();
    digest(&SHA256, path.as_bytes())
        .as_ref()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Runs `op`; if the store is locked, unlocks it once and runs `op` again
///
/// # Errors
/// Returns the error of the first attempt if it is not `Locked`, the unlock
/// error, or the outcome of the second attempt
pub fn with_unlock_retry<S, T, F>(store: &S, mut op: F) -> StoreResult<T>
where
    S: SecretStore + ?Sized,
    F: FnMut(&S) -> StoreResult<T>,
{
    match op(store) {
        Err(StoreError::Locked) => {
            debug!(store = store.store_id(), "Store is locked, unlocking");
            store.unlock()?;
            op(store)
        }
        other => other,
    }
}

/// Credential cache on top of a [`SecretStore`]
pub struct SecretCache {
    store: Box<dyn SecretStore>,
}

impl SecretCache {
    /// Creates a cache over `store`
    #[must_use]
    pub fn new(store: impl SecretStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Connects to the desktop keyring using collection `collection`
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if no Secret Service is running
    pub fn secret_service(collection: &str) -> StoreResult<Self> {
        SecretServiceStore::connect(collection).map(Self::new)
    }

    /// Returns the cached credential of `database`, if any
    ///
    /// If several records exist the first one is used. A record that cannot
    /// be decoded, or that names another database, is reported and treated
    /// as absent so the next `set` replaces it.
    ///
    /// # Errors
    /// Returns `CacheError` if the store fails
    pub fn get(&self, database: &Path) -> CacheResult<Option<Credential>> {
        let key = lookup_key(database);
        let secrets = with_unlock_retry(self.store.as_ref(), |s| s.find(&key))?;

        let Some(first) = secrets.first() else {
            debug!(database = %database.display(), "No keyring record");
            return Ok(None);
        };
        if secrets.len() > 1 {
            warn!(
                database = %database.display(),
                count = secrets.len(),
                "Multiple keyring records, using the first"
            );
        }

        let credential = match CacheRecord::decode(first) {
            Ok(credential) => credential,
            Err(e) => {
                warn!(
                    database = %database.display(),
                    error = %e,
                    "Ignoring unreadable keyring record"
                );
                return Ok(None);
            }
        };
        if credential.database.as_path() != database {
            warn!(
                database = %database.display(),
                recorded = %credential.database.display(),
                "Ignoring keyring record of another database"
            );
            return Ok(None);
        }
        debug!(
            database = %database.display(),
            has_keyfile = credential.keyfile.is_some(),
            has_password = credential.has_password(),
            "Found keyring record"
        );
        Ok(Some(credential))
    }

    /// Stores `credential`, replacing any existing record for its database
    ///
    /// # Errors
    /// Returns `CacheError` if encoding or the store fails
    pub fn set(&self, credential: &Credential) -> CacheResult<()> {
        let key = lookup_key(credential.database());
        let secret = CacheRecord::encode(credential)?;
        let label = format!("keymenu: {}", credential.label());
        with_unlock_retry(self.store.as_ref(), |s| s.put(&key, &label, &secret))?;
        info!(database = %credential.database.display(), "Saved credential to keyring");
        Ok(())
    }

    /// Removes every record of `database`
    ///
    /// # Returns
    /// `true` if anything was removed
    ///
    /// # Errors
    /// Returns `CacheError` if the store fails
    pub fn delete(&self, database: &Path) -> CacheResult<bool> {
        let key = lookup_key(database);
        let removed = with_unlock_retry(self.store.as_ref(), |s| s.remove(&key))?;
        if removed > 0 {
            info!(database = %database.display(), removed, "Deleted keyring record");
        } else {
            debug!(database = %database.display(), "No keyring record to delete");
        }
        Ok(removed > 0)
    }
}

impl std::fmt::Debug for SecretCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCache")
            .field("store", &self.store.store_id())
            .finish()
    }
}
