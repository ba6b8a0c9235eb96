//! One menu run: resolve, load, index, select, deliver
//!
//! Databases are resolved and loaded one at a time in the order given, then
//! merged into a single index. Nothing is delivered unless the user picks an
//! entry.

use tracing::{info, instrument, warn};

use crate::cache::SecretCache;
use crate::config::AppSettings;
use crate::database::DatabaseLoader;
use crate::error::Result;
use crate::index::{DuplicateKeys, EntryFormatter, EntryIndex};
use crate::models::{Credential, LoadedDatabase};
use crate::output::OutputDispatcher;
use crate::registry::BackendRegistry;
use crate::resolver::{CachePolicy, CredentialResolver};
use crate::selection::SelectionProtocol;

/// How a run ended without an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The entry `title` was handed to `backend`
    Delivered { title: String, backend: String },
    /// The filter was closed or returned nothing known
    NothingSelected,
}

/// Ties the registry, loader, filter and cache together for one run
pub struct MenuSession<'a> {
    registry: &'a BackendRegistry,
    loader: &'a dyn DatabaseLoader,
    protocol: SelectionProtocol,
    formatter: EntryFormatter,
    duplicates: DuplicateKeys,
    cache: Option<(&'a SecretCache, CachePolicy)>,
}

impl<'a> MenuSession<'a> {
    #[must_use]
    pub fn new(
        registry: &'a BackendRegistry,
        loader: &'a dyn DatabaseLoader,
        protocol: SelectionProtocol,
    ) -> Self {
        Self {
            registry,
            loader,
            protocol,
            formatter: EntryFormatter::default(),
            duplicates: DuplicateKeys::default(),
            cache: None,
        }
    }

    /// Creates a session with the filter and formatting from `settings`
    #[must_use]
    pub fn from_settings(
        registry: &'a BackendRegistry,
        loader: &'a dyn DatabaseLoader,
        settings: &AppSettings,
    ) -> Self {
        let protocol = SelectionProtocol::with_process(settings.filter.command())
            .with_lines_per_block(settings.filter.lines_per_entry);
        Self::new(registry, loader, protocol)
            .with_formatter(settings.format.formatter(), settings.format.duplicates)
    }

    /// Sets the entry formatter and duplicate handling
    #[must_use]
    pub const fn with_formatter(mut self, formatter: EntryFormatter, duplicates: DuplicateKeys) -> Self {
        self.formatter = formatter;
        self.duplicates = duplicates;
        self
    }

    /// Uses the keyring cache according to `policy`
    #[must_use]
    pub const fn with_cache(mut self, cache: &'a SecretCache, policy: CachePolicy) -> Self {
        self.cache = Some((cache, policy));
        self
    }

    /// Replaces the block height used by the filter
    #[must_use]
    pub fn with_lines_per_block(mut self, lines: Option<usize>) -> Self {
        self.protocol = self.protocol.with_lines_per_block(lines);
        self
    }

    /// Resolves and loads every database, in order
    ///
    /// # Errors
    /// Returns the first resolution or loading error
    pub fn load_all(&self, query: &str, requests: Vec<Credential>) -> Result<Vec<LoadedDatabase>> {
        let query = self.registry.query(query)?;
        let mut resolver = CredentialResolver::new(query);
        if let Some((cache, policy)) = self.cache {
            resolver = resolver.with_cache(cache, policy);
        }

        let mut databases = Vec::with_capacity(requests.len());
        for request in requests {
            let credential = resolver.resolve(request)?;
            databases.push(self.loader.load(&credential)?);
        }
        Ok(databases)
    }

    /// Runs the whole pipeline and delivers the chosen entry through `output`
    ///
    /// # Errors
    /// Returns `KeymenuError` for unknown backends, aborted password entry,
    /// unreadable databases, filter failures and output failures
    #[instrument(skip(self, requests), fields(databases = requests.len()))]
    pub fn run(&self, query: &str, output: &str, requests: Vec<Credential>) -> Result<SessionOutcome> {
        // fail on a misspelt output backend before asking for any password
        self.registry.output(output)?;

        let databases = self.load_all(query, requests)?;
        let index = EntryIndex::build(&databases, &self.formatter, self.duplicates);
        if index.is_empty() {
            warn!("The databases hold no entries");
            return Ok(SessionOutcome::NothingSelected);
        }

        let Some((_, entry)) = self.protocol.select(&index)? else {
            return Ok(SessionOutcome::NothingSelected);
        };
        info!(title = %entry.title, "Entry selected");

        OutputDispatcher::new(self.registry).dispatch(output, entry)?;
        Ok(SessionOutcome::Delivered {
            title: entry.title.clone(),
            backend: output.to_string(),
        })
    }
}

impl std::fmt::Debug for MenuSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuSession")
            .field("protocol", &self.protocol)
            .field("formatter", &self.formatter)
            .field("duplicates", &self.duplicates)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
