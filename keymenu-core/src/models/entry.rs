//! Entry model for records loaded from a KeePass database.

use std::fmt;
use std::path::{Path, PathBuf};

/// One password entry extracted from a database
///
/// All fields are plain strings; an empty string means the field is absent.
/// Entries are created once per database load and never mutated.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub title: String,
    pub url: String,
    pub username: String,
    pub password: String,
    /// Name of the group (folder) holding the entry
    pub group: String,
    pub notes: String,
}

impl Entry {
    /// Creates an entry with a title, username and password
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Sets the group name
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Sets the URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the notes
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

// The password never shows up in debug output or logs
impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("title", &self.title)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("group", &self.group)
            .field("notes", &self.notes)
            .finish()
    }
}

/// The entries of one loaded database, in database order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedDatabase {
    pub path: PathBuf,
    pub entries: Vec<Entry>,
}

impl LoadedDatabase {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, entries: Vec<Entry>) -> Self {
        Self {
            path: path.into(),
            entries,
        }
    }

    /// Returns the database path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
