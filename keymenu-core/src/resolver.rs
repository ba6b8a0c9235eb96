//! Credential resolution for each database
//!
//! For every database the resolver decides whether to reuse a keyring
//! record, ask the user through a password query backend, or refresh the
//! keyring record.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::cache::SecretCache;
use crate::error::{ResolveError, ResolveResult};
use crate::models::Credential;
use crate::query::PasswordQuery;

/// How the resolver uses the keyring cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// Read the cached record and write back new or changed credentials
    pub use_cache: bool,
    /// Delete the cached record before anything else
    pub delete_first: bool,
    /// Also cache passwords given explicitly rather than typed at a prompt
    pub remember_explicit: bool,
}

impl CachePolicy {
    /// Policy for `--key-ring`: read and refresh the cache
    #[must_use]
    pub const fn read_write() -> Self {
        Self {
            use_cache: true,
            delete_first: false,
            remember_explicit: false,
        }
    }

    /// Policy for `--key-ring-delete`: drop the record, never write
    #[must_use]
    pub const fn delete_only() -> Self {
        Self {
            use_cache: false,
            delete_first: true,
            remember_explicit: false,
        }
    }
}

/// Resolves the key file and password of databases
pub struct CredentialResolver<'a> {
    query: Arc<dyn PasswordQuery>,
    cache: Option<&'a SecretCache>,
    policy: CachePolicy,
}

impl<'a> CredentialResolver<'a> {
    /// Creates a resolver that always asks through `query`
    #[must_use]
    pub fn new(query: Arc<dyn PasswordQuery>) -> Self {
        Self {
            query,
            cache: None,
            policy: CachePolicy::default(),
        }
    }

    /// Uses `cache` according to `policy`
    #[must_use]
    pub fn with_cache(mut self, cache: &'a SecretCache, policy: CachePolicy) -> Self {
        self.cache = Some(cache);
        self.policy = policy;
        self
    }

    /// Returns the active cache policy
    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Resolves the credential of one database
    ///
    /// `request` carries the database path and any key file or password
    /// given explicitly on the command line.
    ///
    /// # Errors
    /// Returns `ResolveError::NoPasswordProvided` if the user entered an
    /// empty password, or the cache or query error
    #[tracing::instrument(skip(self, request), fields(database = %request.database.display()))]
    pub fn resolve(&self, request: Credential) -> ResolveResult<Credential> {
        let explicit_password = request.has_password();
        let mut credential = request;

        let cache = self.cache;
        if let Some(cache) = cache.filter(|_| self.policy.delete_first) {
            cache.delete(&credential.database)?;
        }

        let cached = match cache.filter(|_| self.policy.use_cache) {
            Some(cache) => cache.get(&credential.database)?,
            None => None,
        };

        if !explicit_password {
            if let Some(record) = cached.as_ref().filter(|r| r.has_password()) {
                debug!("Using password from keyring");
                credential.password.clone_from(&record.password);
                if credential.keyfile.is_none() {
                    credential.keyfile.clone_from(&record.keyfile);
                }
            }
        }

        if !credential.has_password() {
            let label = credential.label();
            debug!(backend = self.query.description(), "Querying password");
            let password = self.query.query(&label)?;
            if password.expose_secret().is_empty() {
                info!(database = %label, "No password entered");
                return Err(ResolveError::NoPasswordProvided { database: label });
            }
            credential.password = Some(password);
        }

        if let Some(cache) = cache.filter(|_| self.policy.use_cache) {
            let changed = cached.as_ref().is_none_or(|c| !c.same_secret(&credential));
            if changed && (!explicit_password || self.policy.remember_explicit) {
                cache.set(&credential)?;
            }
        }

        Ok(credential)
    }

    /// Resolves every request in order, stopping at the first failure
    ///
    /// # Errors
    /// Returns the first resolution error
    pub fn resolve_all(
        &self,
        requests: impl IntoIterator<Item = Credential>,
    ) -> ResolveResult<Vec<Credential>> {
        requests.into_iter().map(|r| self.resolve(r)).collect()
    }
}

impl std::fmt::Debug for CredentialResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("query", &self.query.description())
            .field("cache", &self.cache)
            .field("policy", &self.policy)
            .finish()
    }
}
