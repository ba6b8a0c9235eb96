//! Configuration manager for TOML file operations

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

use super::settings::AppSettings;

const CONFIG_FILE: &str = "config.toml";

/// Configuration manager for `keymenu`
///
/// Configuration is stored in `~/.config/keymenu/config.toml` by default.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// Base directory for configuration files
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new `ConfigManager` with the default configuration directory
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound(PathBuf::from("~/.config")))?
            .join("keymenu");
        Ok(Self { config_dir })
    }

    /// Creates a new `ConfigManager` with a custom configuration directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the path of the settings file
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Ensures the configuration directory exists
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> ConfigResult<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir).map_err(|e| {
                ConfigError::Write(format!(
                    "Failed to create config directory {}: {}",
                    self.config_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Loads the settings, falling back to defaults if the file is missing
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// holds invalid values.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        let path = self.config_path();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(AppSettings::default());
        }
        Self::load_file(&path)
    }

    /// Loads settings from an explicitly given file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist, or a
    /// parse or validation error.
    pub fn load_file(path: &Path) -> ConfigResult<AppSettings> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;
        let settings: AppSettings = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse {}: {}", path.display(), e)))?;
        settings.validate()?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(settings)
    }

    /// Saves the settings, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_settings(&self, settings: &AppSettings) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        let path = self.config_path();
        let content = toml::to_string_pretty(settings)
            .map_err(|e| ConfigError::Serialize(format!("Failed to serialize: {e}")))?;
        fs::write(&path, content)
            .map_err(|e| ConfigError::Write(format!("Failed to write {}: {}", path.display(), e)))
    }
}
