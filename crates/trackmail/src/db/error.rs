//! Database error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error from rusqlite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error when creating directories or files.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration failed to apply.
    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// An insert hit the `(account_id, fingerprint)` uniqueness
    /// constraint. Concurrent ingestions of the same email surface this
    /// instead of a second application row.
    #[error("Application already exists for fingerprint {fingerprint}")]
    DuplicateFingerprint { fingerprint: String },

    /// Lookup by id returned no row.
    #[error("No {entity} found with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// The database lock was poisoned.
    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl DatabaseError {
    /// True when the underlying SQLite error is a uniqueness violation.
    pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}
