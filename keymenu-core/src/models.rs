//! Core data models for `keymenu`
//!
//! This module defines the records flowing through the pipeline: entries
//! loaded from a KeePass database, the credential used to unlock one, and the
//! form in which that credential is persisted in the keyring.

mod credentials;
mod entry;

pub use credentials::{CacheRecord, Credential};
pub use entry::{Entry, LoadedDatabase};
