//! Typed access to individual configuration keys, as used by
//! `ffs config get|set|list`.

use std::str::FromStr;
use thiserror::Error;

use super::parser::{expand_tilde, parse_bool, parse_path_list};
use super::settings::ConfigFile;
use super::writer::{optional_path_to_string, path_list_to_string, path_to_string};

/// Errors from config key operations.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// A supported `section.key` in config.ini.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    StoreDatabase,
    StoreMagicFile,
    StoreStoreDir,
    StoreDelegateDirs,
    MountAllowRoot,
    MountAutoUnmount,
    MountReadOnly,
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "store.database").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::StoreDatabase => "store.database",
            ConfigKey::StoreMagicFile => "store.magic_file",
            ConfigKey::StoreStoreDir => "store.store_dir",
            ConfigKey::StoreDelegateDirs => "store.delegate_dirs",
            ConfigKey::MountAllowRoot => "mount.allow_root",
            ConfigKey::MountAutoUnmount => "mount.auto_unmount",
            ConfigKey::MountReadOnly => "mount.read_only",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "store").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "database").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::StoreDatabase => path_to_string(&config.store.database),
            ConfigKey::StoreMagicFile => optional_path_to_string(config.store.magic_file.as_deref()),
            ConfigKey::StoreStoreDir => optional_path_to_string(config.store.store_dir.as_deref()),
            ConfigKey::StoreDelegateDirs => path_list_to_string(&config.store.delegate_dirs),
            ConfigKey::MountAllowRoot => config.mount.allow_root.to_string(),
            ConfigKey::MountAutoUnmount => config.mount.auto_unmount.to_string(),
            ConfigKey::MountReadOnly => config.mount.read_only.to_string(),
            ConfigKey::LoggingFile => optional_path_to_string(config.logging.file.as_deref()),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value before setting; on failure the config is unchanged.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        match self {
            ConfigKey::StoreDatabase => {
                if value.is_empty() {
                    return Err(self.invalid("must be a valid path"));
                }
                config.store.database = expand_tilde(value);
            }
            ConfigKey::StoreMagicFile => config.store.magic_file = optional_path(value),
            ConfigKey::StoreStoreDir => config.store.store_dir = optional_path(value),
            ConfigKey::StoreDelegateDirs => config.store.delegate_dirs = parse_path_list(value),
            ConfigKey::MountAllowRoot => config.mount.allow_root = self.boolean(value)?,
            ConfigKey::MountAutoUnmount => config.mount.auto_unmount = self.boolean(value)?,
            ConfigKey::MountReadOnly => config.mount.read_only = self.boolean(value)?,
            ConfigKey::LoggingFile => config.logging.file = optional_path(value),
        }
        Ok(())
    }

    fn boolean(&self, value: &str) -> Result<bool, ConfigKeyError> {
        parse_bool(value).ok_or_else(|| self.invalid("must be true/false, yes/no, 1/0, or on/off"))
    }

    fn invalid(&self, reason: &str) -> ConfigKeyError {
        ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::StoreDatabase,
            ConfigKey::StoreMagicFile,
            ConfigKey::StoreStoreDir,
            ConfigKey::StoreDelegateDirs,
            ConfigKey::MountAllowRoot,
            ConfigKey::MountAutoUnmount,
            ConfigKey::MountReadOnly,
            ConfigKey::LoggingFile,
        ]
    }
}

/// Convert empty string to None, non-empty to Some path with tilde expansion.
fn optional_path(value: &str) -> Option<std::path::PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(expand_tilde(value))
    }
}
