//! Loading KeePass databases into [`Entry`] records

use std::fs::File;
use std::path::Path;

use keepass::db::{Group, Node};
use keepass::{Database, DatabaseKey};
use tracing::debug;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{Credential, Entry, LoadedDatabase};

/// Something that turns a resolved credential into the database entries
pub trait DatabaseLoader {
    /// Opens the database named by `credential` and returns its entries
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened or decrypted
    fn load(&self, credential: &Credential) -> DatabaseResult<LoadedDatabase>;
}

/// Loads KDBX files with the `keepass` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct KdbxLoader;

impl KdbxLoader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn key(credential: &Credential) -> DatabaseResult<DatabaseKey> {
        let mut key = DatabaseKey::new();
        if let Some(password) = credential.expose_password().filter(|p| !p.is_empty()) {
            key = key.with_password(password);
        }
        if let Some(path) = &credential.keyfile {
            let keyfile_error = |reason: String| DatabaseError::Keyfile {
                path: path.clone(),
                reason,
            };
            let mut file = File::open(path).map_err(|e| keyfile_error(e.to_string()))?;
            key = key
                .with_keyfile(&mut file)
                .map_err(|e| keyfile_error(e.to_string()))?;
        }
        Ok(key)
    }
}

impl DatabaseLoader for KdbxLoader {
    fn load(&self, credential: &Credential) -> DatabaseResult<LoadedDatabase> {
        let path = credential.database();
        debug!(
            database = %path.display(),
            has_keyfile = credential.keyfile.is_some(),
            has_password = credential.has_password(),
            "Loading database"
        );

        let open_error = |reason: String| DatabaseError::Open {
            path: path.to_path_buf(),
            reason,
        };
        if path.is_dir() {
            return Err(DatabaseError::Load {
                path: path.to_path_buf(),
                reason: "is a directory".to_string(),
            });
        }
        let mut file = File::open(path).map_err(|e| open_error(e.to_string()))?;
        let key = Self::key(credential)?;
        let db = Database::open(&mut file, key).map_err(|e| open_error(e.to_string()))?;

        let entries = collect_entries(&db.root);
        debug!(database = %path.display(), entries = entries.len(), "Loaded database");
        Ok(LoadedDatabase::new(path, entries))
    }
}

/// Collects the entries of `group` and all nested groups, depth first
///
/// Each entry records the name of the group that directly contains it.
#[must_use]
pub fn collect_entries(group: &Group) -> Vec<Entry> {
    let mut entries = Vec::new();
    walk(group, &mut entries);
    entries
}

fn walk(group: &Group, out: &mut Vec<Entry>) {
    for node in &group.children {
        match node {
            Node::Group(child) => walk(child, out),
            Node::Entry(entry) => out.push(Entry {
                title: entry.get_title().unwrap_or_default().to_string(),
                url: entry.get_url().unwrap_or_default().to_string(),
                username: entry.get_username().unwrap_or_default().to_string(),
                password: entry.get_password().unwrap_or_default().to_string(),
                group: group.name.clone(),
                notes: entry.get("Notes").unwrap_or_default().to_string(),
            }),
        }
    }
}

/// Returns true if `path` looks like a KeePass database file
#[must_use]
pub fn is_kdbx(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("kdbx") || ext.eq_ignore_ascii_case("kdb"))
}
