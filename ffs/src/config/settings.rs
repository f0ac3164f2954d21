//! Settings structs for each configuration section.
//!
//! Each struct is one `[section]` of `config.ini`; parsing and
//! serialization live in [`super::parser`] and [`super::writer`].

use std::path::PathBuf;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub store: StoreSettings,
    pub mount: MountSettings,
    pub logging: LoggingSettings,
}

/// Catalogue location and the directories imported at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// SQLite database file
    pub database: PathBuf,
    /// Compiled magic database; the system default when unset
    pub magic_file: Option<PathBuf>,
    /// Directory tree imported before each command
    pub store_dir: Option<PathBuf>,
    /// Further trees imported after `store_dir`, in order
    pub delegate_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountSettings {
    pub allow_root: bool,
    pub auto_unmount: bool,
    pub read_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file written alongside stderr; none when unset
    pub file: Option<PathBuf>,
}
