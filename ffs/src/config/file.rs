//! Configuration file handling for ~/.ffs/config.ini.
//!
//! Loads and saves user configuration with defaults, and applies the
//! `FFS_*` environment overrides on top of it.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::parser::{expand_tilde, parse_path_list};
use super::settings::ConfigFile;
use crate::mount::MountOptions;

/// Database location override. A `sqlite://` prefix is accepted.
pub const ENV_DB_URL: &str = "FFS_DB_URL";
/// Compiled magic database override.
pub const ENV_MAGIC_FILE: &str = "FFS_MAGIC_FILE";
pub const ENV_STORE_DIR: &str = "FFS_STORE_DIR";
/// Comma-separated delegate directories.
pub const ENV_DELEGATE_DIRS: &str = "FFS_DELEGATE_DIRS";
pub const ENV_LOG_FILE: &str = "FFS_LOG_FILE";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create a config file with defaults at `path` if none exists there.
    ///
    /// Returns whether a file was written.
    pub fn ensure_exists_at(path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Apply the `FFS_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides looked up by variable name. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_DB_URL) {
            let path = url.trim();
            self.store.database = expand_tilde(path.strip_prefix("sqlite://").unwrap_or(path));
        }
        if let Some(path) = get(ENV_MAGIC_FILE) {
            self.store.magic_file = Some(expand_tilde(path.trim()));
        }
        if let Some(path) = get(ENV_STORE_DIR) {
            self.store.store_dir = Some(expand_tilde(path.trim()));
        }
        if let Some(list) = get(ENV_DELEGATE_DIRS) {
            self.store.delegate_dirs = parse_path_list(&list);
        }
        if let Some(path) = get(ENV_LOG_FILE) {
            self.logging.file = Some(expand_tilde(path.trim()));
        }
    }

    /// Mount options described by the `[mount]` section.
    pub fn mount_options(&self) -> MountOptions {
        MountOptions {
            allow_root: self.mount.allow_root,
            auto_unmount: self.mount.auto_unmount,
            read_only: self.mount.read_only,
            ..MountOptions::default()
        }
    }

    /// Directories imported before each command: `store_dir` first, then
    /// the delegates.
    pub fn import_dirs(&self) -> Vec<&Path> {
        self.store
            .store_dir
            .iter()
            .chain(&self.store.delegate_dirs)
            .map(PathBuf::as_path)
            .collect()
    }
}

/// Get the path to the config directory (~/.ffs).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ffs")
}

/// Get the path to the config file (~/.ffs/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
