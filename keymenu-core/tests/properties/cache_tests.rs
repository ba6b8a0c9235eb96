//! Property-based tests for the keyring cache
//!
//! **Property: Cache round-trip** - a stored credential is returned intact
//! and is gone after deletion.
//! **Property: Unlock retry** - a locked store is unlocked exactly once.

use keymenu_core::cache::{lookup_key, MemoryStore, SecretCache};
use keymenu_core::{CacheError, CacheRecord, Credential, StoreError};
use proptest::prelude::*;
use std::path::PathBuf;

// ========== Generators ==========

/// Strategy for absolute database paths, including awkward characters
fn arb_database() -> impl Strategy<Value = PathBuf> {
    "/[a-zA-Z0-9 ._:=-]{1,20}(/[a-zA-Z0-9 ._:=-]{1,20}){0,3}\\.kdbx".prop_map(PathBuf::from)
}

/// Strategy for optional key files
fn arb_keyfile() -> impl Strategy<Value = Option<PathBuf>> {
    prop_oneof![
        Just(None),
        "/[a-z0-9 :=]{1,15}(/[a-z0-9 :=]{1,15}){0,2}".prop_map(|s| Some(PathBuf::from(s))),
    ]
}

/// Strategy for passwords, including quotes, separators and unicode
fn arb_password() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~]{1,32}",
        "[a-z]{1,8}(::::|==|\"|\\\\|\n)[a-z]{1,8}",
        "\\PC{1,16}",
    ]
}

fn arb_credential() -> impl Strategy<Value = Credential> {
    (arb_database(), arb_keyfile(), arb_password()).prop_map(|(database, keyfile, password)| {
        let credential = Credential::new(database).with_password(password);
        match keyfile {
            Some(keyfile) => credential.with_keyfile(keyfile),
            None => credential,
        }
    })
}

fn cache() -> (SecretCache, MemoryStore) {
    let store = MemoryStore::new();
    (SecretCache::new(store.clone()), store)
}

// ========== Properties ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Set then get returns an equivalent credential
    #[test]
    fn prop_set_then_get_round_trips(credential in arb_credential()) {
        let (cache, _) = cache();
        cache.set(&credential).unwrap();

        let found = cache.get(&credential.database).unwrap().unwrap();
        prop_assert_eq!(found, credential);
    }

    /// Delete then get returns nothing
    #[test]
    fn prop_delete_then_get_is_absent(credential in arb_credential()) {
        let (cache, store) = cache();
        cache.set(&credential).unwrap();

        prop_assert!(cache.delete(&credential.database).unwrap());
        prop_assert!(cache.get(&credential.database).unwrap().is_none());
        prop_assert_eq!(store.item_count(), 0);
    }

    /// A database that was never stored is absent, not an error
    #[test]
    fn prop_unknown_database_is_absent(stored in arb_credential(), other in arb_database()) {
        prop_assume!(stored.database != other);
        let (cache, _) = cache();
        cache.set(&stored).unwrap();

        prop_assert!(cache.get(&other).unwrap().is_none());
        prop_assert!(!cache.delete(&other).unwrap());
    }

    /// Setting twice keeps a single record holding the latest credential
    #[test]
    fn prop_set_replaces(first in arb_credential(), password in arb_password()) {
        let (cache, store) = cache();
        cache.set(&first).unwrap();
        let second = first.clone().with_password(password);
        cache.set(&second).unwrap();

        prop_assert_eq!(store.item_count(), 1);
        prop_assert_eq!(cache.get(&first.database).unwrap().unwrap(), second);
    }

    /// Lookup keys are 64 lowercase hex digits and differ between paths
    #[test]
    fn prop_lookup_key_shape(a in arb_database(), b in arb_database()) {
        let key = lookup_key(&a);
        prop_assert_eq!(key.len(), 64);
        prop_assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        prop_assert_eq!(a == b, key == lookup_key(&b));
    }

    /// A locked store is unlocked once and the operation succeeds
    #[test]
    fn prop_locked_store_unlocks_once(credential in arb_credential()) {
        let (cache, store) = cache();
        cache.set(&credential).unwrap();
        store.lock();

        let found = cache.get(&credential.database).unwrap();
        prop_assert!(found.is_some());
        prop_assert_eq!(store.unlock_calls(), 1);
        prop_assert!(!store.is_locked());
    }

    /// With several records under one key the first is returned
    #[test]
    fn prop_duplicate_records_use_first(first in arb_credential(), password in arb_password()) {
        let (cache, store) = cache();
        let second = first.clone().with_password(password);
        let key = lookup_key(&first.database);
        store.insert_raw(&key, "one", &CacheRecord::encode(&first).unwrap());
        store.insert_raw(&key, "two", &CacheRecord::encode(&second).unwrap());

        prop_assert_eq!(cache.get(&first.database).unwrap().unwrap(), first);
    }
}

#[test]
fn test_stubborn_lock_surfaces_locked() {
    let (cache, store) = cache();
    store.lock();
    store.set_stubborn(true);

    let err = cache.get(&PathBuf::from("/tmp/a.kdbx")).unwrap_err();
    assert!(matches!(err, CacheError::Store(StoreError::Locked)));
    assert_eq!(store.unlock_calls(), 1);
}

#[test]
fn test_garbage_record_reads_as_absent_and_is_replaced() {
    let (cache, store) = cache();
    let database = PathBuf::from("/tmp/a.kdbx");
    store.insert_raw(&lookup_key(&database), "junk", b"db:::/tmp/a.kdbx");

    assert!(cache.get(&database).unwrap().is_none());

    cache
        .set(&Credential::new(database.clone()).with_password("pw"))
        .unwrap();
    let stored = cache.get(&database).unwrap().unwrap();
    assert_eq!(stored.expose_password(), Some("pw"));
    assert_eq!(store.item_count(), 1);
}
