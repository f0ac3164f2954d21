//! INI serialization: [`ConfigFile`] to the commented text written to
//! `config.ini`.

use std::path::{Path, PathBuf};

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let magic_file = optional_path_to_string(config.store.magic_file.as_deref());
    let store_dir = optional_path_to_string(config.store.store_dir.as_deref());
    let log_file = optional_path_to_string(config.logging.file.as_deref());

    format!(
        r#"[store]
; SQLite catalogue of points and tags
database = {}
; Compiled magic database used for auto-tagging (empty = system default)
magic_file = {}
; Directory tree imported before every command (empty = none)
store_dir = {}
; Further trees to import, comma-separated
delegate_dirs = {}

[mount]
; Let root access the mount as well as the mounting user
allow_root = {}
; Unmount when the ffs process exits
auto_unmount = {}
; Refuse mkdir/rmdir inside the mount
read_only = {}

[logging]
; Log file written in addition to stderr (empty = stderr only)
file = {}
"#,
        path_to_string(&config.store.database),
        magic_file,
        store_dir,
        path_list_to_string(&config.store.delegate_dirs),
        config.mount.allow_root,
        config.mount.auto_unmount,
        config.mount.read_only,
        log_file,
    )
}

/// Convert path to display string, collapsing home dir to ~.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

pub(super) fn optional_path_to_string(path: Option<&Path>) -> String {
    path.map(path_to_string).unwrap_or_default()
}

pub(super) fn path_list_to_string(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| path_to_string(p))
        .collect::<Vec<_>>()
        .join(", ")
}
