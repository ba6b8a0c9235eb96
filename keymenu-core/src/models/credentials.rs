//! Credential model for unlocking a database and caching it in the keyring.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

/// Everything needed to open one database
///
/// The database path doubles as the database identity: the keyring record
/// for a database is keyed by a digest of this path.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Absolute path of the database file
    pub database: PathBuf,
    /// Optional key file
    pub keyfile: Option<PathBuf>,
    /// Optional master password
    pub password: Option<SecretString>,
}

impl Credential {
    /// Creates a credential with neither key file nor password
    #[must_use]
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            keyfile: None,
            password: None,
        }
    }

    /// Sets the key file
    #[must_use]
    pub fn with_keyfile(mut self, keyfile: impl Into<PathBuf>) -> Self {
        self.keyfile = Some(keyfile.into());
        self
    }

    /// Sets the password
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Returns the database path
    #[must_use]
    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Exposes the password for use (should be used carefully)
    #[must_use]
    pub fn expose_password(&self) -> Option<&str> {
        self.password
            .as_ref()
            .map(secrecy::ExposeSecret::expose_secret)
    }

    /// Returns true if a non-empty password is present
    #[must_use]
    pub fn has_password(&self) -> bool {
        self.expose_password().is_some_and(|p| !p.is_empty())
    }

    /// The short label shown when asking for the password (file name only)
    #[must_use]
    pub fn label(&self) -> String {
        self.database.file_name().map_or_else(
            || self.database.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }

    /// Returns true if key file and password match `other`
    ///
    /// An empty password and a missing one are considered equal.
    #[must_use]
    pub fn same_secret(&self, other: &Self) -> bool {
        self.keyfile == other.keyfile
            && self.expose_password().unwrap_or_default()
                == other.expose_password().unwrap_or_default()
    }
}

// Manual PartialEq implementation since SecretString doesn't implement it
impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.database == other.database
            && self.keyfile == other.keyfile
            && match (&self.password, &other.password) {
                (Some(a), Some(b)) => a.expose_secret() == b.expose_secret(),
                (None, None) => true,
                _ => false,
            }
    }
}

/// Current version of the keyring record layout
const RECORD_VERSION: u32 = 1;

/// The persisted form of a [`Credential`] inside the keyring
///
/// Records are JSON objects so that separators occurring inside paths or
/// passwords cannot corrupt them. Empty strings stand for absent fields.
#[derive(Serialize, Deserialize)]
pub struct CacheRecord {
    version: u32,
    database: String,
    #[serde(default)]
    keyfile: String,
    #[serde(default)]
    password: String,
}

impl CacheRecord {
    /// Encodes a credential into the bytes stored as the keyring secret
    ///
    /// # Errors
    /// Returns `CacheError::Serialize` if encoding fails
    pub fn encode(credential: &Credential) -> CacheResult<Vec<u8>> {
        let record = Self {
            version: RECORD_VERSION,
            database: credential.database.to_string_lossy().into_owned(),
            keyfile: credential
                .keyfile
                .as_ref()
                .map(|k| k.to_string_lossy().into_owned())
                .unwrap_or_default(),
            password: credential.expose_password().unwrap_or_default().to_string(),
        };
        serde_json::to_vec(&record).map_err(|e| CacheError::Serialize(e.to_string()))
    }

    /// Decodes keyring secret bytes into a credential
    ///
    /// # Errors
    /// Returns `CacheError::Deserialize` if the bytes are not a valid record
    pub fn decode(bytes: &[u8]) -> CacheResult<Credential> {
        let record: Self =
            serde_json::from_slice(bytes).map_err(|e| CacheError::Deserialize(e.to_string()))?;
        if record.version > RECORD_VERSION {
            return Err(CacheError::Deserialize(format!(
                "unsupported record version {}",
                record.version
            )));
        }
        Ok(Credential {
            database: PathBuf::from(record.database),
            keyfile: (!record.keyfile.is_empty()).then(|| PathBuf::from(record.keyfile)),
            password: (!record.password.is_empty()).then(|| SecretString::from(record.password)),
        })
    }
}
