//! SQLite PRAGMA configuration.
//! Must be called on every connection immediately after opening.

use rusqlite::Connection;

use pagescore_core::errors::AuditResult;

use crate::to_storage_err;

/// Configure the writer connection.
///
/// - WAL for concurrent readers during writes
/// - busy_timeout for lock contention (primary concurrency mechanism)
/// - foreign keys enforced (audits and share links reference their owners)
pub fn configure_connection(conn: &Connection) -> AuditResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA cache_size = -8000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(to_storage_err)?;
    Ok(())
}

/// Configure a reader connection. The journal mode is inherited from the file;
/// `query_only` prevents accidental writes.
pub fn configure_readonly_connection(conn: &Connection) -> AuditResult<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA cache_size = -8000;
        PRAGMA temp_store = MEMORY;
        PRAGMA query_only = ON;
        ",
    )
    .map_err(to_storage_err)?;
    Ok(())
}
