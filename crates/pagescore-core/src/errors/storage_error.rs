//! Storage-layer errors for datastore operations.

use super::error_code::{self, PageScoreErrorCode};

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Database busy (another operation in progress)")]
    Busy,

    #[error("Datastore unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },
}

impl StorageError {
    /// Transient failures: the same call may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Busy | Self::Unavailable { .. })
    }
}

impl PageScoreErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy => error_code::DB_BUSY,
            Self::Unavailable { .. } => error_code::STORAGE_UNAVAILABLE,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
