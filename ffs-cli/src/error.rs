//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and the exit code.

use std::fmt;
use std::path::PathBuf;
use std::process;

use ffs::config::{ConfigFileError, ENV_MAGIC_FILE};
use ffs::inspect::InspectError;
use ffs::library::{ImportError, LibraryError};
use ffs::mount::MountError;
use ffs::store::StoreError;
use ffs::tag::TagParseError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Config file could not be read or written
    ConfigFile(ConfigFileError),
    /// Failed to create a directory the CLI needs
    Directory { path: PathBuf, error: std::io::Error },
    /// Failed to open the catalogue
    Store(StoreError),
    /// Failed to load the magic database
    Inspect(InspectError),
    /// A catalogue operation failed
    Library(LibraryError),
    /// Importing a store directory failed
    Import(ImportError),
    /// Malformed tag argument
    Tag(TagParseError),
    /// FUSE mount error
    Mount(MountError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Inspect(InspectError::Load { .. }) => {
                eprintln!();
                eprintln!("Point {} or store.magic_file at a compiled magic", ENV_MAGIC_FILE);
                eprintln!("database, e.g. /usr/share/misc/magic.mgc");
            }
            CliError::Mount(MountError::Session { .. }) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. FUSE not installed: sudo apt install fuse3 (Linux)");
                eprintln!("  2. Permissions: You may need to add your user to 'fuse' group");
                eprintln!(
                    "  3. Mountpoint in use: Try unmounting with: fusermount -u <mountpoint>"
                );
                eprintln!("  4. mount.allow_root needs user_allow_other in /etc/fuse.conf");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::Directory { path, error } => {
                write!(f, "Failed to create directory '{}': {}", path.display(), error)
            }
            CliError::Store(e) => write!(f, "Failed to open catalogue: {}", e),
            CliError::Inspect(e) => write!(f, "Failed to set up content inspection: {}", e),
            CliError::Library(e) => write!(f, "{}", e),
            CliError::Import(e) => write!(f, "Import failed: {}", e),
            CliError::Tag(e) => write!(f, "Invalid tag: {}", e),
            CliError::Mount(e) => write!(f, "FUSE server error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Directory { error, .. } => Some(error),
            CliError::Store(e) => Some(e),
            CliError::Inspect(e) => Some(e),
            CliError::Library(e) => Some(e),
            CliError::Import(e) => Some(e),
            CliError::Tag(e) => Some(e),
            CliError::Mount(e) => Some(e),
            CliError::LoggingInit(_) | CliError::Config(_) => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<InspectError> for CliError {
    fn from(e: InspectError) -> Self {
        CliError::Inspect(e)
    }
}

impl From<LibraryError> for CliError {
    fn from(e: LibraryError) -> Self {
        CliError::Library(e)
    }
}

impl From<ImportError> for CliError {
    fn from(e: ImportError) -> Self {
        CliError::Import(e)
    }
}

impl From<TagParseError> for CliError {
    fn from(e: TagParseError) -> Self {
        CliError::Tag(e)
    }
}

impl From<MountError> for CliError {
    fn from(e: MountError) -> Self {
        CliError::Mount(e)
    }
}
