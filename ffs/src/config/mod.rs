//! User configuration stored in `~/.ffs/config.ini`.
//!
//! Sections map to [`StoreSettings`], [`MountSettings`] and
//! [`LoggingSettings`]. [`ConfigKey`] gives typed per-key access for the
//! `config` command.

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::{default_database_path, DEFAULT_DATABASE_NAME};
pub use file::{
    config_directory, config_file_path, ConfigFileError, ENV_DB_URL, ENV_DELEGATE_DIRS,
    ENV_LOG_FILE, ENV_MAGIC_FILE, ENV_STORE_DIR,
};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{ConfigFile, LoggingSettings, MountSettings, StoreSettings};
