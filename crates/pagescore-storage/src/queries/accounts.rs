//! Accounts, plans, subscriptions, and monthly free grants.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use pagescore_core::errors::AuditResult;
use pagescore_core::types::{
    Account, Plan, PlanFlagOverrides, PlanLimits, Subscription, SubscriptionStatus, UsagePeriod,
};

use crate::{from_millis, to_millis, to_storage_err};

pub fn insert_account(conn: &Connection, account: &Account) -> AuditResult<()> {
    conn.execute(
        "INSERT INTO accounts (id, created_at) VALUES (?1, ?2)",
        params![account.id, to_millis(account.created_at)],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn get_account(conn: &Connection, account_id: &str) -> AuditResult<Option<Account>> {
    conn.query_row(
        "SELECT id, created_at FROM accounts WHERE id = ?1",
        params![account_id],
        |row| {
            Ok(Account {
                id: row.get(0)?,
                created_at: from_millis(1, row.get(1)?)?,
            })
        },
    )
    .optional()
    .map_err(to_storage_err)
}

pub fn upsert_plan(conn: &Connection, plan: &Plan) -> AuditResult<()> {
    let o = &plan.overrides;
    conn.execute(
        "INSERT INTO plans (name, audits_per_month, pdf_exports, history_days,
            can_auto_audit, can_export_pdf, can_share_report,
            can_view_full_metrics, can_view_demographics, can_view_ai_insights)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(name) DO UPDATE SET
            audits_per_month = excluded.audits_per_month,
            pdf_exports = excluded.pdf_exports,
            history_days = excluded.history_days,
            can_auto_audit = excluded.can_auto_audit,
            can_export_pdf = excluded.can_export_pdf,
            can_share_report = excluded.can_share_report,
            can_view_full_metrics = excluded.can_view_full_metrics,
            can_view_demographics = excluded.can_view_demographics,
            can_view_ai_insights = excluded.can_view_ai_insights",
        params![
            plan.name,
            plan.limits.audits_per_month,
            plan.limits.pdf_exports,
            plan.limits.history_days,
            o.can_auto_audit,
            o.can_export_pdf,
            o.can_share_report,
            o.can_view_full_metrics,
            o.can_view_demographics,
            o.can_view_ai_insights,
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn get_plan(conn: &Connection, name: &str) -> AuditResult<Option<Plan>> {
    conn.query_row(
        "SELECT name, audits_per_month, pdf_exports, history_days,
                can_auto_audit, can_export_pdf, can_share_report,
                can_view_full_metrics, can_view_demographics, can_view_ai_insights
         FROM plans WHERE name = ?1",
        params![name],
        |row| {
            Ok(Plan {
                name: row.get(0)?,
                limits: PlanLimits {
                    audits_per_month: row.get(1)?,
                    pdf_exports: row.get(2)?,
                    history_days: row.get(3)?,
                },
                overrides: PlanFlagOverrides {
                    can_auto_audit: row.get(4)?,
                    can_export_pdf: row.get(5)?,
                    can_share_report: row.get(6)?,
                    can_view_full_metrics: row.get(7)?,
                    can_view_demographics: row.get(8)?,
                    can_view_ai_insights: row.get(9)?,
                },
            })
        },
    )
    .optional()
    .map_err(to_storage_err)
}

/// Single-record-per-account upsert. Deliveries older than the stored
/// record are dropped, so out-of-order webhooks cannot roll state back.
pub fn upsert_subscription(conn: &Connection, subscription: &Subscription) -> AuditResult<()> {
    let changed = conn
        .execute(
            "INSERT INTO subscriptions (account_id, plan, status, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(account_id) DO UPDATE SET
                plan = excluded.plan,
                status = excluded.status,
                updated_at = excluded.updated_at
             WHERE excluded.updated_at >= subscriptions.updated_at",
            params![
                subscription.account_id,
                subscription.plan,
                subscription.status.as_str(),
                to_millis(subscription.updated_at),
            ],
        )
        .map_err(to_storage_err)?;
    if changed == 0 {
        debug!(account_id = %subscription.account_id, "stale subscription update ignored");
    }
    Ok(())
}

pub fn get_subscription(conn: &Connection, account_id: &str) -> AuditResult<Option<Subscription>> {
    conn.query_row(
        "SELECT account_id, plan, status, updated_at FROM subscriptions WHERE account_id = ?1",
        params![account_id],
        |row| {
            let raw_status: String = row.get(2)?;
            let status = SubscriptionStatus::parse(&raw_status).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    format!("unknown subscription status '{raw_status}'").into(),
                )
            })?;
            Ok(Subscription {
                account_id: row.get(0)?,
                plan: row.get(1)?,
                status,
                updated_at: from_millis(3, row.get(3)?)?,
            })
        },
    )
    .optional()
    .map_err(to_storage_err)
}

/// `INSERT OR IGNORE` on (account, period). True only for the call that created the row.
pub fn insert_free_grant(
    conn: &Connection,
    account_id: &str,
    period: &UsagePeriod,
    granted_at: DateTime<Utc>,
) -> AuditResult<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO monthly_grants (account_id, period, granted_at)
             VALUES (?1, ?2, ?3)",
            params![account_id, period.key(), to_millis(granted_at)],
        )
        .map_err(to_storage_err)?;
    Ok(inserted == 1)
}

pub fn has_free_grant(conn: &Connection, account_id: &str, period: &UsagePeriod) -> AuditResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM monthly_grants WHERE account_id = ?1 AND period = ?2)",
        params![account_id, period.key()],
        |row| row.get(0),
    )
    .map_err(to_storage_err)
}
