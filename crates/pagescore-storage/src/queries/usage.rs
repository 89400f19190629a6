//! Per-(account, period) audit counters.
//!
//! Counters are only ever moved by a single upsert statement. A read followed
//! by a write would let two concurrent requests both pass the limit check.

use rusqlite::{params, Connection, OptionalExtension};

use pagescore_core::errors::AuditResult;
use pagescore_core::types::UsagePeriod;

use crate::to_storage_err;

pub fn get_usage_count(conn: &Connection, account_id: &str, period: &UsagePeriod) -> AuditResult<u32> {
    let count: Option<u32> = conn
        .query_row(
            "SELECT audit_count FROM usage_periods WHERE account_id = ?1 AND period = ?2",
            params![account_id, period.key()],
            |row| row.get(0),
        )
        .optional()
        .map_err(to_storage_err)?;
    Ok(count.unwrap_or(0))
}

/// Unconditional increment, creating the row at 1. Returns the new count.
pub fn increment_usage(conn: &Connection, account_id: &str, period: &UsagePeriod) -> AuditResult<u32> {
    conn.query_row(
        "INSERT INTO usage_periods (account_id, period, audit_count) VALUES (?1, ?2, 1)
         ON CONFLICT(account_id, period) DO UPDATE SET audit_count = audit_count + 1
         RETURNING audit_count",
        params![account_id, period.key()],
        |row| row.get(0),
    )
    .map_err(to_storage_err)
}

/// Increment only while the counter is below `limit`.
/// `Some(new_count)` on success, `None` when the limit was already reached.
pub fn try_increment_usage(
    conn: &Connection,
    account_id: &str,
    period: &UsagePeriod,
    limit: u32,
) -> AuditResult<Option<u32>> {
    // The insert branch of the upsert ignores the WHERE clause.
    if limit == 0 {
        return Ok(None);
    }
    conn.query_row(
        "INSERT INTO usage_periods (account_id, period, audit_count) VALUES (?1, ?2, 1)
         ON CONFLICT(account_id, period) DO UPDATE SET audit_count = audit_count + 1
            WHERE usage_periods.audit_count < ?3
         RETURNING audit_count",
        params![account_id, period.key(), limit],
        |row| row.get(0),
    )
    .optional()
    .map_err(to_storage_err)
}
