//! CLI runner for common setup.
//!
//! Loads configuration, initializes logging and opens the catalogue so
//! command handlers only deal with their own work.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use ffs::config::{config_file_path, ConfigFile};
use ffs::inspect::{Inspector, MagicClassifier};
use ffs::library::{ImportError, Library};
use ffs::logging::{init_logging, LoggingGuard};
use ffs::store::Store;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: LoggingGuard,
    /// Configuration with environment overrides applied
    config: ConfigFile,
}

impl CliRunner {
    /// Create a runner, loading config (default path unless `config_path`)
    /// and initializing logging.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config = load_config(config_path)?;

        let logging_guard = init_logging(config.logging.file.as_deref())
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("ffs v{}", ffs::VERSION);
        info!(database = %self.config.store.database.display(), "ffs CLI: {} command", command);
    }

    /// Open the catalogue with automatic tagging, importing the configured
    /// store and delegate directories unless `skip_import`.
    pub fn open_library(&self, skip_import: bool) -> Result<Library, CliError> {
        let database = &self.config.store.database;
        if let Some(dir) = database.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|error| CliError::Directory {
                path: dir.to_path_buf(),
                error,
            })?;
        }

        let store = Store::open(database)?;
        let classifier = MagicClassifier::open(self.config.store.magic_file.as_deref())?;
        let mut library = Library::new(store, Inspector::new(Box::new(classifier)));

        if !skip_import {
            import_configured(&mut library, &self.config)?;
        }

        Ok(library)
    }
}

/// Load the config file and apply `FFS_*` environment overrides.
pub fn load_config(config_path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let path = resolve_config_path(config_path);
    let mut config = ConfigFile::load_from(&path)?;
    config.apply_env();
    Ok(config)
}

/// The config file in use: `--config` if given, else ~/.ffs/config.ini.
pub fn resolve_config_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path)
}

/// Import `store_dir` and then each delegate directory.
///
/// A configured directory that does not exist is skipped with a warning;
/// any other import failure aborts.
fn import_configured(library: &mut Library, config: &ConfigFile) -> Result<(), CliError> {
    for dir in config.import_dirs() {
        match library.import_store(dir) {
            Ok(report) => info!(
                dir = %dir.display(),
                imported = report.imported,
                skipped = report.skipped,
                "imported store directory"
            ),
            Err(ImportError::NotADirectory(path)) => {
                warn!(dir = %path.display(), "configured store directory is missing; skipped")
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
