//! Ordered index from rendered display blocks back to entries
//!
//! The index is built once per run from every loaded database and thrown
//! away after the selection. Keys are the exact strings sent to the filter,
//! so the text the filter returns can be looked up verbatim.

mod format;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Entry, LoadedDatabase};

pub use format::{truncate, EntryFormatter, BLOCK_LINES, EMPTY_LINE, RECORD_SEPARATOR};

/// Hidden suffix appended to duplicate display blocks (zero-width space)
pub const DISAMBIGUATION_MARK: char = '\u{200b}';

/// What to do when two entries render to the same display block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateKeys {
    /// Keep both: the later block gets an invisible suffix
    #[default]
    Disambiguate,
    /// The later entry replaces the earlier one under the shared key
    LastWins,
}

/// Display block to entry mapping, in database order then entry order
#[derive(Debug, Clone, Default)]
pub struct EntryIndex {
    entries: Vec<(String, Entry)>,
    positions: HashMap<String, usize>,
}

impl EntryIndex {
    /// Renders every entry of `databases` and indexes it by its block
    #[must_use]
    pub fn build(
        databases: &[LoadedDatabase],
        formatter: &EntryFormatter,
        policy: DuplicateKeys,
    ) -> Self {
        let entries: Vec<&Entry> = databases.iter().flat_map(|db| &db.entries).collect();
        let blocks = formatter.render_all(entries.iter().copied());

        let mut index = Self::default();
        for (block, entry) in blocks.into_iter().zip(entries) {
            index.insert(block, entry.clone(), policy);
        }
        debug!(
            databases = databases.len(),
            entries = index.len(),
            "Built entry index"
        );
        index
    }

    fn insert(&mut self, key: String, entry: Entry, policy: DuplicateKeys) {
        let Some(&existing) = self.positions.get(&key) else {
            self.push(key, entry);
            return;
        };

        match policy {
            DuplicateKeys::LastWins => {
                warn!(
                    title = %entry.title,
                    "Two entries render identically; the later one hides the earlier"
                );
                self.entries[existing].1 = entry;
            }
            DuplicateKeys::Disambiguate => {
                let mut unique = key;
                while self.positions.contains_key(&unique) {
                    unique.push(DISAMBIGUATION_MARK);
                }
                warn!(
                    title = %entry.title,
                    "Two entries render identically; marking the later one"
                );
                self.push(unique, entry);
            }
        }
    }

    fn push(&mut self, key: String, entry: Entry) {
        self.positions.insert(key.clone(), self.entries.len());
        self.entries.push((key, entry));
    }

    /// Number of selectable blocks
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display blocks in index order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Looks up the entry rendered as `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.get_key_value(key).map(|(_, entry)| entry)
    }

    /// Looks up `key`, returning the stored key alongside the entry
    #[must_use]
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &Entry)> {
        let &position = self.positions.get(key)?;
        let (key, entry) = &self.entries[position];
        Some((key.as_str(), entry))
    }

    /// Iterates `(block, entry)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}
