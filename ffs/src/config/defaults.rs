//! Default values for every configuration setting.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;

/// Database file name inside the config directory.
pub const DEFAULT_DATABASE_NAME: &str = "ffs.db";

/// Default database location (~/.ffs/ffs.db).
pub fn default_database_path() -> PathBuf {
    config_directory().join(DEFAULT_DATABASE_NAME)
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            magic_file: None,
            store_dir: None,
            delegate_dirs: Vec::new(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            store: StoreSettings::default(),
            mount: MountSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
