//! Store error types.

use thiserror::Error;

/// Errors raised by the tag store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The referenced point does not exist
    #[error("point {0} not found")]
    PointNotFound(i64),
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;
