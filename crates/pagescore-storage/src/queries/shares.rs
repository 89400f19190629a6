//! Share link rows.
//!
//! Publish, revoke, and view counting are each one statement, so concurrent
//! requests for the same audit or slug never interleave mid-update.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use pagescore_core::errors::{AuditError, AuditResult};
use pagescore_core::types::{PublicView, PublishOutcome, ShareRecord};

use crate::{from_millis, is_unique_violation, to_millis, to_storage_err};

fn count_from_sql(column: usize, raw: i64) -> rusqlite::Result<u64> {
    u64::try_from(raw).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(column, raw))
}

pub fn get_share(conn: &Connection, audit_id: &str) -> AuditResult<Option<ShareRecord>> {
    conn.query_row(
        "SELECT audit_id, slug, is_public, view_count, updated_at
         FROM share_links WHERE audit_id = ?1",
        params![audit_id],
        |row| {
            Ok(ShareRecord {
                audit_id: row.get(0)?,
                slug: row.get(1)?,
                is_public: row.get(2)?,
                view_count: count_from_sql(3, row.get(3)?)?,
                updated_at: from_millis(4, row.get(4)?)?,
            })
        },
    )
    .optional()
    .map_err(to_storage_err)
}

/// Publish `slug` unless the audit is already public.
///
/// The upsert only rewrites a row that is private (or slug-less); a unique
/// violation means the slug addresses some other audit.
pub fn publish(
    conn: &Connection,
    audit_id: &str,
    slug: &str,
    at: DateTime<Utc>,
) -> AuditResult<PublishOutcome> {
    let result = conn
        .query_row(
            "INSERT INTO share_links (audit_id, slug, is_public, view_count, updated_at)
             VALUES (?1, ?2, 1, 0, ?3)
             ON CONFLICT(audit_id) DO UPDATE SET
                slug = excluded.slug,
                is_public = 1,
                updated_at = excluded.updated_at
             WHERE share_links.is_public = 0 OR share_links.slug IS NULL
             RETURNING slug",
            params![audit_id, slug, to_millis(at)],
            |row| row.get::<_, String>(0),
        )
        .optional();

    match result {
        Ok(Some(slug)) => Ok(PublishOutcome::Published { slug }),
        Ok(None) => {
            let existing = get_share(conn, audit_id)?;
            match existing.as_ref().and_then(ShareRecord::active_slug) {
                Some(slug) => Ok(PublishOutcome::AlreadyPublic {
                    slug: slug.to_string(),
                }),
                None => Err(AuditError::conflict(format!(
                    "share state of audit {audit_id} changed during publish"
                ))),
            }
        }
        Err(e) if is_unique_violation(&e) => Ok(PublishOutcome::SlugTaken),
        Err(e) => Err(to_storage_err(e)),
    }
}

/// Clears slug and public flag; `view_count` is kept.
pub fn revoke(conn: &Connection, audit_id: &str, at: DateTime<Utc>) -> AuditResult<bool> {
    let changed = conn
        .execute(
            "UPDATE share_links SET slug = NULL, is_public = 0, updated_at = ?2
             WHERE audit_id = ?1 AND is_public = 1",
            params![audit_id, to_millis(at)],
        )
        .map_err(to_storage_err)?;
    Ok(changed == 1)
}

pub fn record_view(conn: &Connection, slug: &str) -> AuditResult<Option<PublicView>> {
    conn.query_row(
        "UPDATE share_links SET view_count = view_count + 1
         WHERE slug = ?1 AND is_public = 1
         RETURNING audit_id, view_count",
        params![slug],
        |row| {
            Ok(PublicView {
                audit_id: row.get(0)?,
                view_count: count_from_sql(1, row.get(1)?)?,
            })
        },
    )
    .optional()
    .map_err(to_storage_err)
}
