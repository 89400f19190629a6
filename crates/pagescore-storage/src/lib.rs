//! # pagescore-storage
//!
//! SQLite persistence for the audit subsystem.
//! Implements `IAuditStorage` on top of a single write connection + read pool (WAL mode).
//! Contended counters and the slug set are only ever mutated by single atomic statements.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod pragmas;
pub mod queries;
pub mod schema;

pub use engine::AuditStorageEngine;

use chrono::{DateTime, Utc};
use pagescore_core::errors::{AuditError, StorageError};
use rusqlite::ffi::ErrorCode;

/// Convert a rusqlite error into an AuditError::Storage, classifying busy and constraint failures.
pub fn to_storage_err(e: rusqlite::Error) -> AuditError {
    let storage = match &e {
        rusqlite::Error::SqliteFailure(failure, message) => match failure.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => StorageError::Busy,
            ErrorCode::ConstraintViolation => StorageError::ConstraintViolation {
                message: message.clone().unwrap_or_else(|| e.to_string()),
            },
            _ => StorageError::Sqlite {
                message: e.to_string(),
            },
        },
        _ => StorageError::Sqlite {
            message: e.to_string(),
        },
    };
    AuditError::Storage(storage)
}

/// True for a UNIQUE constraint failure (as opposed to NOT NULL, FK, ...).
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}

/// Decode a JSON TEXT column.
pub(crate) fn json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    column: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}
