//! Configuration management for `keymenu`
//!
//! This module provides the `ConfigManager` for loading and saving the
//! settings file in TOML format.

mod manager;
pub mod settings;

pub use manager::ConfigManager;
pub use settings::{AppSettings, BackendSettings, CacheSettings, FilterSettings, FormatSettings};
