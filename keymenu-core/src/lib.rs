//! `keymenu` Core Library
//!
//! This crate provides the core of `keymenu`: resolving KeePass database
//! credentials (interactively or from the desktop keyring), presenting the
//! entries through an external filter such as rofi, and delivering the
//! selected credential through an output backend.

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod index;
pub mod models;
pub mod output;
pub mod process;
pub mod query;
pub mod registry;
pub mod resolver;
pub mod selection;
pub mod session;

pub use cache::{lookup_key, with_unlock_retry, MemoryStore, SecretCache, SecretServiceStore, SecretStore};
pub use config::{AppSettings, ConfigManager};
pub use database::{DatabaseLoader, KdbxLoader};
pub use error::{
    BackendError, CacheError, ConfigError, ConfigResult, DatabaseError, KeymenuError, OutputError,
    QueryError, ResolveError, SelectionError, StoreError,
};
pub use index::{DuplicateKeys, EntryFormatter, EntryIndex};
pub use models::{CacheRecord, Credential, Entry, LoadedDatabase};
pub use output::{OutputBackend, OutputDispatcher, OutputPayload};
pub use query::PasswordQuery;
pub use registry::{Backend, BackendKind, BackendRegistry};
pub use resolver::{CachePolicy, CredentialResolver};
pub use selection::{FilterCommand, SelectionFilter, SelectionProtocol};
pub use session::{MenuSession, SessionOutcome};
