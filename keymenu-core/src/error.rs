//! Error types for `keymenu`
//!
//! This module defines the error types used throughout the crate, one enum
//! per concern: backend registration, the keyring store and cache, credential
//! resolution, database loading, the selection filter and output delivery.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for `keymenu` operations
#[derive(Debug, Error)]
pub enum KeymenuError {
    /// Backend registry errors (unknown or duplicate backend names)
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Credential resolution errors
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Keyring cache errors
    #[error("Keyring error: {0}")]
    Cache(#[from] CacheError),

    /// Database loading errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Selection filter errors
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Output backend errors
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl KeymenuError {
    /// Returns true if the error is the user declining to continue
    /// (empty password entry) rather than a failure.
    #[must_use]
    pub const fn is_user_abort(&self) -> bool {
        matches!(self, Self::Resolve(ResolveError::NoPasswordProvided { .. }))
    }
}

/// Errors raised by the backend registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    /// A name is already bound and overwrite was not requested
    #[error("{name} is already registered in {namespace}")]
    Duplicate {
        /// The name being registered
        name: String,
        /// The namespace that already holds it
        namespace: String,
    },

    /// No backend is bound to the requested name
    #[error("Unknown backend '{name}' in {namespace} (available: {})", available.join(", "))]
    Unknown {
        /// The requested name
        name: String,
        /// The namespace searched
        namespace: String,
        /// Names registered in that namespace
        available: Vec<String>,
    },

    /// A path segment names a leaf where a namespace was expected
    #[error("{0} is a backend, not a namespace")]
    NotANamespace(String),

    /// The leaf exists but implements another backend family
    #[error("{name} is not a {expected} backend")]
    KindMismatch {
        /// The requested name
        name: String,
        /// The expected backend family
        expected: &'static str,
    },
}

/// Errors reported by a secret store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The collection is locked and must be unlocked first
    #[error("Secret store is locked")]
    Locked,

    /// The store (D-Bus session, Secret Service daemon) cannot be reached
    #[error("Secret store unavailable: {0}")]
    Unavailable(String),

    /// Any other failure reported by the store
    #[error("Secret store failure: {0}")]
    Service(String),
}

/// Errors related to the keyring credential cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// The underlying store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A record could not be encoded
    #[error("Failed to serialize cache record: {0}")]
    Serialize(String),

    /// A stored record could not be decoded
    #[error("Failed to deserialize cache record: {0}")]
    Deserialize(String),
}

/// Errors raised by password query backends
#[derive(Debug, Error)]
pub enum QueryError {
    /// The helper program could not be found
    #[error("Program not found: {0}")]
    ProgramNotFound(String),

    /// Reading the password failed
    #[error("Failed to read password: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to credential resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The user submitted an empty password or closed the prompt
    #[error("No password provided for {database}")]
    NoPasswordProvided {
        /// Database file name shown to the user
        database: String,
    },

    /// The keyring cache failed
    #[error("Keyring error: {0}")]
    Cache(#[from] CacheError),

    /// The password query backend failed
    #[error("Password query failed: {0}")]
    Query(#[from] QueryError),
}

/// Errors related to loading KeePass databases
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database file could not be opened or decrypted
    #[error("Failed to open {path}: {reason}")]
    Open {
        /// The database path
        path: PathBuf,
        /// Why it failed
        reason: String,
    },

    /// The key file could not be read
    #[error("Failed to read key file {path}: {reason}")]
    Keyfile {
        /// The key file path
        path: PathBuf,
        /// Why it failed
        reason: String,
    },

    /// The database was opened but its entries could not be extracted
    #[error("Failed to load entries from {path}: {reason}")]
    Load {
        /// The database path
        path: PathBuf,
        /// Why it failed
        reason: String,
    },
}

/// Errors related to the external selection filter
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The filter program is not installed
    #[error("Filter program not found: {0}")]
    FilterNotFound(String),

    /// Spawning or talking to the filter failed
    #[error("Filter I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to output backends
#[derive(Debug, Error)]
pub enum OutputError {
    /// A helper program (xsel, xdotool) is not installed
    #[error("Program not found: {0}")]
    ProgramNotFound(String),

    /// A helper program exited with a failure status
    #[error("{program} failed: {stderr}")]
    CommandFailed {
        /// The program that failed
        program: String,
        /// Its standard error output
        stderr: String,
    },

    /// Writing the output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The output backend menu failed
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// The output backend menu resolved to an unknown name
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors related to configuration file operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A setting has an unusable value
    #[error("Invalid setting {field}: {reason}")]
    Validation {
        /// The offending setting
        field: String,
        /// Why it is rejected
        reason: String,
    },

    /// Configuration file or directory not found
    #[error("Configuration not found: {0}")]
    NotFound(PathBuf),

    /// Failed to write configuration file
    #[error("Failed to write configuration: {0}")]
    Write(String),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),
}

/// Result type alias for `keymenu` operations
pub type Result<T> = std::result::Result<T, KeymenuError>;

/// Result type alias for secret store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Result type alias for password query operations
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Result type alias for credential resolution
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Result type alias for database operations
pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

/// Result type alias for selection operations
pub type SelectionResult<T> = std::result::Result<T, SelectionError>;

/// Result type alias for output operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
