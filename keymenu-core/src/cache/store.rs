//! Secret store abstraction and the in-memory store

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{StoreError, StoreResult};

/// A keyed blob store with lock/unlock semantics
///
/// Keys are not unique: a store may hold several items under the same key
/// (written by other tools or older versions), which is why [`find`]
/// returns every match.
///
/// [`find`]: SecretStore::find
pub trait SecretStore {
    /// Returns the secrets of every item stored under `key`
    ///
    /// # Errors
    /// Returns `StoreError::Locked` if the store must be unlocked first
    fn find(&self, key: &str) -> StoreResult<Vec<Vec<u8>>>;

    /// Stores `secret` under `key`, replacing an existing item
    ///
    /// # Arguments
    /// * `key` - Lookup key
    /// * `label` - Human readable label shown by keyring managers
    /// * `secret` - Secret bytes
    ///
    /// # Errors
    /// Returns `StoreError::Locked` if the store must be unlocked first
    fn put(&self, key: &str, label: &str, secret: &[u8]) -> StoreResult<()>;

    /// Removes every item stored under `key` and returns how many there were
    ///
    /// # Errors
    /// Returns `StoreError::Locked` if the store must be unlocked first
    fn remove(&self, key: &str) -> StoreResult<usize>;

    /// Unlocks the store, possibly asking the user
    ///
    /// # Errors
    /// Returns `StoreError` if the store stays locked or cannot be reached
    fn unlock(&self) -> StoreResult<()>;

    /// Returns a static identifier for log messages
    fn store_id(&self) -> &'static str;
}

#[derive(Debug, Default)]
struct MemoryState {
    items: HashMap<String, Vec<(String, Vec<u8>)>>,
    locked: bool,
    /// Unlock attempts that keep the store locked
    stubborn: bool,
    unlock_calls: usize,
    writes: usize,
}

/// In-process secret store
///
/// Clones share the same contents, so a test can keep a handle while the
/// cache owns another. The lock flag simulates a locked keyring.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the store; every operation fails until it is unlocked
    pub fn lock(&self) {
        self.state().locked = true;
    }

    /// Makes unlock attempts fail to unlock the store
    pub fn set_stubborn(&self, stubborn: bool) {
        self.state().stubborn = stubborn;
    }

    /// Returns true if the store is locked
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state().locked
    }

    /// Number of times `unlock` was called
    #[must_use]
    pub fn unlock_calls(&self) -> usize {
        self.state().unlock_calls
    }

    /// Number of successful `put` calls
    #[must_use]
    pub fn writes(&self) -> usize {
        self.state().writes
    }

    /// Adds an item without replacing existing ones under the same key
    pub fn insert_raw(&self, key: &str, label: &str, secret: &[u8]) {
        self.state()
            .items
            .entry(key.to_string())
            .or_default()
            .push((label.to_string(), secret.to_vec()));
    }

    /// Total number of stored items
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.state().items.values().map(Vec::len).sum()
    }

    fn unlocked(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        let state = self.state();
        if state.locked {
            Err(StoreError::Locked)
        } else {
            Ok(state)
        }
    }
}

impl SecretStore for MemoryStore {
    fn find(&self, key: &str) -> StoreResult<Vec<Vec<u8>>> {
        let state = self.unlocked()?;
        Ok(state
            .items
            .get(key)
            .map(|items| items.iter().map(|(_, secret)| secret.clone()).collect())
            .unwrap_or_default())
    }

    fn put(&self, key: &str, label: &str, secret: &[u8]) -> StoreResult<()> {
        let mut state = self.unlocked()?;
        state
            .items
            .insert(key.to_string(), vec![(label.to_string(), secret.to_vec())]);
        state.writes += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<usize> {
        let mut state = self.unlocked()?;
        Ok(state.items.remove(key).map_or(0, |items| items.len()))
    }

    fn unlock(&self) -> StoreResult<()> {
        let mut state = self.state();
        state.unlock_calls += 1;
        if !state.stubborn {
            state.locked = false;
        }
        Ok(())
    }

    fn store_id(&self) -> &'static str {
        "memory"
    }
}
