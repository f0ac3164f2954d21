//! Content classification through libmagic.

use std::path::{Path, PathBuf};

use magic::cookie::{DatabasePaths, Flags, Load};
use magic::Cookie;
use thiserror::Error;
use tracing::debug;

/// Errors from content classification.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The libmagic cookie could not be created
    #[error("failed to open libmagic: {0}")]
    Open(String),

    /// The magic database could not be loaded
    #[error("failed to load magic database {}: {message}", display_database(.path))]
    Load {
        path: Option<PathBuf>,
        message: String,
    },

    /// libmagic could not describe a file
    #[error("failed to classify {}: {message}", .path.display())]
    Classify { path: PathBuf, message: String },
}

fn display_database(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "(system default)".to_string(),
    }
}

/// Source of textual content descriptions.
///
/// libmagic is the production implementation; tests substitute fixed
/// descriptions.
pub trait Classifier {
    /// Describe the content at `path` in libmagic's comma-separated form,
    /// e.g. `PNG image data, 800 x 600, 8-bit/color RGBA, non-interlaced`.
    fn describe(&self, path: &Path) -> Result<String, InspectError>;
}

/// Classifier backed by a loaded libmagic database.
pub struct MagicClassifier {
    cookie: Cookie<Load>,
}

impl MagicClassifier {
    /// Open libmagic with the given compiled database, or the system default
    /// when `magic_file` is `None`.
    pub fn open(magic_file: Option<&Path>) -> Result<Self, InspectError> {
        let cookie = Cookie::open(Flags::ERROR).map_err(|e| InspectError::Open(e.to_string()))?;

        let load_error = |message: String| InspectError::Load {
            path: magic_file.map(Path::to_path_buf),
            message,
        };

        let databases = match magic_file {
            Some(path) => DatabasePaths::try_from([path]).map_err(|e| load_error(e.to_string()))?,
            None => DatabasePaths::default(),
        };

        let cookie = cookie
            .load(&databases)
            .map_err(|e| load_error(e.to_string()))?;

        debug!(
            database = %display_database(&magic_file.map(Path::to_path_buf)),
            "loaded magic database"
        );

        Ok(Self { cookie })
    }
}

impl Classifier for MagicClassifier {
    fn describe(&self, path: &Path) -> Result<String, InspectError> {
        self.cookie.file(path).map_err(|e| InspectError::Classify {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
