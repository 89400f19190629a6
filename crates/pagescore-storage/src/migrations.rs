//! Schema versioning via a dedicated single-row `schema_version` table.
//!
//! - Each version bump is a const SQL string in schema.rs
//! - `migrate` applies every step above the stored version, in order

use rusqlite::Connection;
use tracing::info;

use pagescore_core::errors::{AuditError, AuditResult, StorageError};

use super::schema::SCHEMA_V1;
use crate::to_storage_err;

/// Current schema version. Bump this when adding new migrations.
pub const CURRENT_VERSION: u32 = 1;

/// Get the current schema version. 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> AuditResult<u32> {
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .map_err(to_storage_err)?;
    if !exists {
        return Ok(0);
    }

    match conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
        row.get::<_, u32>(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(to_storage_err(e)),
    }
}

fn set_schema_version(conn: &Connection, version: u32) -> AuditResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        ) STRICT;",
    )
    .map_err(to_storage_err)?;
    conn.execute("DELETE FROM schema_version", [])
        .map_err(to_storage_err)?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        rusqlite::params![version],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

fn apply_step(conn: &Connection, version: u32, sql: &str) -> AuditResult<()> {
    conn.execute_batch(sql).map_err(|e| {
        AuditError::Storage(StorageError::MigrationFailed {
            version,
            message: e.to_string(),
        })
    })?;
    set_schema_version(conn, version)
}

/// Run all pending migrations. Returns the version the database ends at.
pub fn migrate(conn: &Connection) -> AuditResult<u32> {
    let current = get_schema_version(conn)?;

    if current >= CURRENT_VERSION {
        return Ok(current);
    }

    if current < 1 {
        info!("Migrating schema: 0 → 1 (initial tables)");
        apply_step(conn, 1, SCHEMA_V1)?;
    }

    let final_version = get_schema_version(conn)?;
    info!(from = current, to = final_version, "Schema migration complete");
    Ok(final_version)
}
