use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;
use crate::tag::TagParseError;

/// Errors from catalogue maintenance.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading or hashing a path failed
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Paths are stored as text
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// The path has no final component to name the point after
    #[error("cannot name a point after {}", .0.display())]
    Unnamed(PathBuf),

    #[error("point {0} not found")]
    PointNotFound(i64),

    /// No tag of the point matches the query
    #[error("point {point} has no tag matching '{query}'")]
    TagNotFound { point: i64, query: String },

    /// More than one tag of the point matches the query
    #[error("'{query}' matches {count} tags of point {point}; be more specific")]
    AmbiguousTag {
        point: i64,
        query: String,
        count: usize,
    },
}

pub type LibraryResult<T> = Result<T, LibraryError>;

/// Errors that abort a store directory import.
///
/// Problems with individual entries are logged and the entry skipped.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("store directory {} does not exist or is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The `@flat-info` file holds a malformed tag
    #[error("invalid @flat-info in {}: {source}", .dir.display())]
    FlatInfo {
        dir: PathBuf,
        #[source]
        source: TagParseError,
    },

    #[error(transparent)]
    Library(#[from] LibraryError),
}
