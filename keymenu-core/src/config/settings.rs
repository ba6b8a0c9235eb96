//! Application settings model
//!
//! This module defines the settings stored in config.toml.

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_COLLECTION;
use crate::error::{ConfigError, ConfigResult};
use crate::index::{DuplicateKeys, EntryFormatter};
use crate::selection::{FilterCommand, DEFAULT_FILTER, DEFAULT_SEPARATOR};

/// Application-wide settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Default backends
    #[serde(default)]
    pub backends: BackendSettings,
    /// Keyring cache settings
    #[serde(default)]
    pub cache: CacheSettings,
    /// Selection filter settings
    #[serde(default)]
    pub filter: FilterSettings,
    /// Entry formatting settings
    #[serde(default)]
    pub format: FormatSettings,
}

impl AppSettings {
    /// Checks values that parse but cannot work
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` naming the first bad setting
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field: &str, reason: &str| -> ConfigResult<()> {
            Err(ConfigError::Validation {
                field: field.to_string(),
                reason: reason.to_string(),
            })
        };
        if self.filter.program.trim().is_empty() {
            return invalid("filter.program", "must not be empty");
        }
        let mut separator = self.filter.separator.chars();
        match (separator.next(), separator.next()) {
            (Some(c), None) if !c.is_alphanumeric() => {}
            (Some(_), None) => {
                return invalid("filter.separator", "must not be a letter or digit");
            }
            _ => return invalid("filter.separator", "must be exactly one character"),
        }
        if self.filter.lines_per_entry == Some(0) {
            return invalid("filter.lines_per_entry", "must be at least 1");
        }
        if self.format.long_width < MIN_WIDTH {
            return invalid("format.long_width", "must be at least 4");
        }
        if self.format.short_width < MIN_WIDTH {
            return invalid("format.short_width", "must be at least 4");
        }
        if self.cache.collection.trim().is_empty() {
            return invalid("cache.collection", "must not be empty");
        }
        Ok(())
    }
}

/// Smallest usable field width (one character plus the ellipsis)
const MIN_WIDTH: usize = 4;

/// Backends used when none is given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Output backend name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Password query backend name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// Keyring cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Use the keyring even without `--key-ring`
    #[serde(default)]
    pub enabled: bool,
    /// Label of the keyring collection
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            collection: default_collection(),
        }
    }
}

/// Selection filter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Filter program
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments always passed to the filter
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Separator token between multi-line entries
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Fixed number of lines per entry instead of inferring it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_per_entry: Option<usize>,
    /// Prompt shown by the filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

fn default_program() -> String {
    DEFAULT_FILTER.to_string()
}

fn default_args() -> Vec<String> {
    FilterCommand::default().args
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            separator: default_separator(),
            lines_per_entry: None,
            prompt: None,
        }
    }
}

impl FilterSettings {
    /// Builds the filter command
    #[must_use]
    pub fn command(&self) -> FilterCommand {
        FilterCommand {
            program: self.program.clone(),
            args: self.args.clone(),
            separator: self.separator.clone(),
            prompt: self.prompt.clone(),
        }
    }
}

/// Entry formatting settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSettings {
    /// Width of title, URL and username
    #[serde(default = "default_long_width")]
    pub long_width: usize,
    /// Width of group and notes
    #[serde(default = "default_short_width")]
    pub short_width: usize,
    /// Handling of entries that render identically
    #[serde(default)]
    pub duplicates: DuplicateKeys,
}

const fn default_long_width() -> usize {
    40
}

const fn default_short_width() -> usize {
    30
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            long_width: default_long_width(),
            short_width: default_short_width(),
            duplicates: DuplicateKeys::default(),
        }
    }
}

impl FormatSettings {
    /// Builds the entry formatter
    #[must_use]
    pub const fn formatter(&self) -> EntryFormatter {
        EntryFormatter::new(self.long_width, self.short_width)
    }
}
