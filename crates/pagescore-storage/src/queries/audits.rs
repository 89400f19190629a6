//! Audit rows and the metered create transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use tracing::debug;

use pagescore_core::errors::AuditResult;
use pagescore_core::traits::storage::CreateAuditOutcome;
use pagescore_core::types::{Audit, ScoreBreakdown, UsagePeriod};

use super::usage;
use crate::{from_millis, json_column, to_millis, to_storage_err};

const AUDIT_COLUMNS: &str = "id, account_id, score, engagement_score, consistency_score,
    readiness_score, inputs, metrics, posts, recommendations, ai_insights, demographics,
    unlocked, created_at";

fn optional_json(row: &Row<'_>, column: usize) -> rusqlite::Result<Option<serde_json::Value>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|text| {
        serde_json::from_str(&text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
    })
    .transpose()
}

fn row_to_audit(row: &Row<'_>) -> rusqlite::Result<Audit> {
    Ok(Audit {
        id: row.get(0)?,
        account_id: row.get(1)?,
        score: row.get(2)?,
        breakdown: ScoreBreakdown {
            engagement: row.get(3)?,
            consistency: row.get(4)?,
            readiness: row.get(5)?,
        },
        inputs: json_column(row, 6)?,
        metrics: json_column(row, 7)?,
        posts: json_column(row, 8)?,
        recommendations: json_column(row, 9)?,
        ai_insights: optional_json(row, 10)?,
        demographics: optional_json(row, 11)?,
        unlocked: row.get(12)?,
        created_at: from_millis(13, row.get(13)?)?,
    })
}

pub fn insert_audit(conn: &Connection, audit: &Audit, request_key: Option<&str>) -> AuditResult<()> {
    let inputs = serde_json::to_string(&audit.inputs)?;
    let metrics = serde_json::to_string(&audit.metrics)?;
    let posts = serde_json::to_string(&audit.posts)?;
    let recommendations = serde_json::to_string(&audit.recommendations)?;
    let ai_insights = audit.ai_insights.as_ref().map(serde_json::to_string).transpose()?;
    let demographics = audit.demographics.as_ref().map(serde_json::to_string).transpose()?;

    conn.execute(
        &format!(
            "INSERT INTO audits (request_key, {AUDIT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            request_key,
            audit.id,
            audit.account_id,
            audit.score,
            audit.breakdown.engagement,
            audit.breakdown.consistency,
            audit.breakdown.readiness,
            inputs,
            metrics,
            posts,
            recommendations,
            ai_insights,
            demographics,
            audit.unlocked,
            to_millis(audit.created_at),
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn get_audit(conn: &Connection, audit_id: &str) -> AuditResult<Option<Audit>> {
    conn.query_row(
        &format!("SELECT {AUDIT_COLUMNS} FROM audits WHERE id = ?1"),
        params![audit_id],
        row_to_audit,
    )
    .optional()
    .map_err(to_storage_err)
}

pub fn find_by_request_key(
    conn: &Connection,
    account_id: &str,
    request_key: &str,
) -> AuditResult<Option<Audit>> {
    conn.query_row(
        &format!("SELECT {AUDIT_COLUMNS} FROM audits WHERE account_id = ?1 AND request_key = ?2"),
        params![account_id, request_key],
        row_to_audit,
    )
    .optional()
    .map_err(to_storage_err)
}

/// Newest first. Ties on `created_at` fall back to insertion order.
pub fn list_audits(
    conn: &Connection,
    account_id: &str,
    since: DateTime<Utc>,
    limit: usize,
) -> AuditResult<Vec<Audit>> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audits
             WHERE account_id = ?1 AND created_at >= ?2
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?3"
        ))
        .map_err(to_storage_err)?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt
        .query_map(params![account_id, to_millis(since), limit], row_to_audit)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Sticky. Returns false if no such audit.
pub fn set_unlocked(conn: &Connection, audit_id: &str) -> AuditResult<bool> {
    let changed = conn
        .execute(
            "UPDATE audits SET unlocked = 1 WHERE id = ?1",
            params![audit_id],
        )
        .map_err(to_storage_err)?;
    Ok(changed == 1)
}

/// Replay check, conditional usage increment, and insert in one
/// `BEGIN IMMEDIATE` transaction. Nothing is written unless all three agree.
pub fn create_metered(
    conn: &Connection,
    audit: &Audit,
    request_key: Option<&str>,
    period: &UsagePeriod,
    limit: u32,
) -> AuditResult<CreateAuditOutcome> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(to_storage_err)?;

    if let Some(key) = request_key {
        if let Some(existing) = find_by_request_key(&tx, &audit.account_id, key)? {
            debug!(audit_id = %existing.id, "request key replayed");
            return Ok(CreateAuditOutcome::Replayed { audit: existing });
        }
    }

    let used = match usage::try_increment_usage(&tx, &audit.account_id, period, limit)? {
        Some(used) => used,
        None => {
            let used = usage::get_usage_count(&tx, &audit.account_id, period)?;
            tx.rollback().map_err(to_storage_err)?;
            return Ok(CreateAuditOutcome::LimitReached { used });
        }
    };

    insert_audit(&tx, audit, request_key)?;
    tx.commit().map_err(to_storage_err)?;

    Ok(CreateAuditOutcome::Created {
        audit: audit.clone(),
        used,
    })
}
