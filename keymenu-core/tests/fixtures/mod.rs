//! Test fixtures for end-to-end menu runs.
//!
//! Provides canned databases, a loader that serves them without touching
//! KDBX files, a filter that picks by content, and an output that records
//! what it was handed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use keymenu_core::error::{DatabaseError, DatabaseResult, OutputResult, SelectionResult};
use keymenu_core::output::{OutputBackend, OutputPayload};
use keymenu_core::selection::{FilterInvocation, SelectionFilter, DEFAULT_SEPARATOR};
use keymenu_core::{Credential, DatabaseLoader, Entry, LoadedDatabase};

pub const NETFLIX_DB: &str = "/vault/netflix.kdbx";
pub const GOOGLE_DB: &str = "/vault/google.kdbx";

/// The Netflix entry used across the end-to-end tests
#[must_use]
pub fn netflix() -> Entry {
    Entry::new("Netflix", "n@example.com", "n-secret")
        .with_group("Root")
        .with_url("netflix.com")
}

/// The Google entry used across the end-to-end tests
#[must_use]
pub fn google() -> Entry {
    Entry::new("Google", "g@example.com", "g-secret").with_group("Root")
}

/// Loader serving canned entries to callers with the right password
pub struct StubLoader {
    databases: HashMap<PathBuf, (String, Vec<Entry>)>,
    pub opened: Mutex<Vec<PathBuf>>,
}

impl StubLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            databases: HashMap::new(),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Adds a database unlocked by `password`
    #[must_use]
    pub fn with(mut self, path: &str, password: &str, entries: Vec<Entry>) -> Self {
        self.databases
            .insert(PathBuf::from(path), (password.to_string(), entries));
        self
    }

    /// Netflix and Google, one database each
    #[must_use]
    pub fn two_databases() -> Self {
        Self::new()
            .with(NETFLIX_DB, "pw", vec![netflix()])
            .with(GOOGLE_DB, "pw", vec![google()])
    }
}

impl DatabaseLoader for StubLoader {
    fn load(&self, credential: &Credential) -> DatabaseResult<LoadedDatabase> {
        let open_error = |reason: &str| DatabaseError::Open {
            path: credential.database.clone(),
            reason: reason.to_string(),
        };
        let (password, entries) = self
            .databases
            .get(&credential.database)
            .ok_or_else(|| open_error("no such database"))?;
        if credential.expose_password() != Some(password.as_str()) {
            return Err(open_error("invalid credentials"));
        }
        self.opened.lock().unwrap().push(credential.database.clone());
        Ok(LoadedDatabase::new(&credential.database, entries.clone()))
    }
}

/// Filter returning the first block containing `needle`
pub struct PickContaining {
    pub needle: String,
    pub invocations: Mutex<Vec<FilterInvocation>>,
}

impl PickContaining {
    #[must_use]
    pub fn new(needle: &str) -> Self {
        Self {
            needle: needle.to_string(),
            invocations: Mutex::new(Vec::new()),
        }
    }
}

impl SelectionFilter for PickContaining {
    fn run(&self, invocation: &FilterInvocation) -> SelectionResult<String> {
        self.invocations.lock().unwrap().push(invocation.clone());
        let separator = format!("\n{DEFAULT_SEPARATOR}");
        Ok(invocation
            .input
            .split(separator.as_str())
            .find(|block| block.contains(&self.needle))
            .map(|block| format!("{block}\n"))
            .unwrap_or_default())
    }
}

/// Output backend remembering every payload it was handed
#[derive(Default)]
pub struct RecordingOutput {
    pub delivered: Mutex<Vec<(String, String)>>,
}

impl OutputBackend for RecordingOutput {
    fn deliver(&self, payload: &OutputPayload) -> OutputResult<()> {
        self.delivered
            .lock()
            .unwrap()
            .push((payload.username.clone(), payload.expose_password().to_string()));
        Ok(())
    }

    fn description(&self) -> &'static str {
        "records deliveries"
    }
}
