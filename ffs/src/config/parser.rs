//! INI parsing: `Ini` to [`ConfigFile`].
//!
//! The single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

const TRUE_VALUES: [&str; 4] = ["true", "1", "yes", "on"];
const FALSE_VALUES: [&str; 4] = ["false", "0", "no", "off"];

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [store] section
    if let Some(section) = ini.section(Some("store")) {
        if let Some(v) = non_empty(section, "database") {
            config.store.database = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "magic_file") {
            config.store.magic_file = Some(expand_tilde(v));
        }
        if let Some(v) = non_empty(section, "store_dir") {
            config.store.store_dir = Some(expand_tilde(v));
        }
        if let Some(v) = section.get("delegate_dirs") {
            config.store.delegate_dirs = parse_path_list(v);
        }
    }

    // [mount] section
    if let Some(section) = ini.section(Some("mount")) {
        if let Some(v) = section.get("allow_root") {
            config.mount.allow_root = bool_value("mount", "allow_root", v)?;
        }
        if let Some(v) = section.get("auto_unmount") {
            config.mount.auto_unmount = bool_value("mount", "auto_unmount", v)?;
        }
        if let Some(v) = section.get("read_only") {
            config.mount.read_only = bool_value("mount", "read_only", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = Some(expand_tilde(v));
        }
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn bool_value(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    parse_bool(value).ok_or_else(|| ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: "must be true/false, yes/no, 1/0, or on/off".to_string(),
    })
}

/// Parse a boolean written as true/false, yes/no, 1/0 or on/off.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    let v = value.trim().to_lowercase();
    if TRUE_VALUES.contains(&v.as_str()) {
        Some(true)
    } else if FALSE_VALUES.contains(&v.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Split a comma-separated list of paths, dropping empty items.
pub(super) fn parse_path_list(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(expand_tilde)
        .collect()
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        parse_ini(&Ini::load_from_str(content).unwrap())
    }

    #[test]
    fn test_empty_ini_gives_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_store_section() {
        let config = parse(
            "[store]\n\
             database = /data/ffs.db\n\
             magic_file = /usr/share/misc/magic.mgc\n\
             store_dir = /data/store\n\
             delegate_dirs = /a, /b ,,\n",
        )
        .unwrap();

        assert_eq!(config.store.database, Path::new("/data/ffs.db"));
        assert_eq!(
            config.store.magic_file.as_deref(),
            Some(Path::new("/usr/share/misc/magic.mgc"))
        );
        assert_eq!(config.store.store_dir.as_deref(), Some(Path::new("/data/store")));
        assert_eq!(
            config.store.delegate_dirs,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let config = parse("[store]\ndatabase =\nmagic_file =\n[logging]\nfile =\n").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_mount_section() {
        let config = parse("[mount]\nallow_root = yes\nauto_unmount = On\nread_only = 0\n").unwrap();
        assert!(config.mount.allow_root);
        assert!(config.mount.auto_unmount);
        assert!(!config.mount.read_only);
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        let err = parse("[mount]\nread_only = maybe\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "mount");
                assert_eq!(key, "read_only");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_expand_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/x/ffs.db"), home.join("x/ffs.db"));
        }
        assert_eq!(expand_tilde("/abs"), PathBuf::from("/abs"));
        assert_eq!(expand_tilde("~user/x"), PathBuf::from("~user/x"));
    }
}
