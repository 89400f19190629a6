//! `IAuditStorage` trait: abstraction over the datastore.
//!
//! Every mutation that can race (usage counters, share slugs) is a single
//! atomic datastore operation behind one of these methods. Callers never
//! read-modify-write.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::errors::AuditResult;
use crate::types::{
    Account, Audit, Plan, PublicView, PublishOutcome, ShareRecord, Subscription, UsagePeriod,
};

/// Result of a metered audit insert.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateAuditOutcome {
    /// Stored, and the period counter moved to `used`.
    Created { audit: Audit, used: u32 },
    /// The request key was seen before; nothing was written or counted.
    Replayed { audit: Audit },
    /// The conditional increment failed; nothing was written.
    LimitReached { used: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHealth {
    pub connected: bool,
    pub wal_mode: bool,
    pub schema_version: u32,
}

/// Abstraction over accounts, billing state, usage, audits, and share links.
pub trait IAuditStorage: Send + Sync {
    // ── Accounts & billing ──

    fn insert_account(&self, account: &Account) -> AuditResult<()>;

    fn get_account(&self, account_id: &str) -> AuditResult<Option<Account>>;

    fn upsert_plan(&self, plan: &Plan) -> AuditResult<()>;

    fn get_plan(&self, name: &str) -> AuditResult<Option<Plan>>;

    /// Insert or overwrite the account's single subscription record.
    fn upsert_subscription(&self, subscription: &Subscription) -> AuditResult<()>;

    fn get_subscription(&self, account_id: &str) -> AuditResult<Option<Subscription>>;

    /// Conditional insert. Returns false if the period already had a grant.
    fn insert_free_grant(
        &self,
        account_id: &str,
        period: &UsagePeriod,
        granted_at: DateTime<Utc>,
    ) -> AuditResult<bool>;

    fn has_free_grant(&self, account_id: &str, period: &UsagePeriod) -> AuditResult<bool>;

    // ── Usage ──

    fn get_usage_count(&self, account_id: &str, period: &UsagePeriod) -> AuditResult<u32>;

    /// Atomic unconditional increment. Returns the new count.
    fn increment_usage(&self, account_id: &str, period: &UsagePeriod) -> AuditResult<u32>;

    // ── Audits ──

    /// Insert `audit` and bump the period counter in one transaction,
    /// only if the counter is below `limit`.
    fn create_audit(
        &self,
        audit: &Audit,
        request_key: Option<&str>,
        period: &UsagePeriod,
        limit: u32,
    ) -> AuditResult<CreateAuditOutcome>;

    fn get_audit(&self, audit_id: &str) -> AuditResult<Option<Audit>>;

    /// Audits of an account created at or after `since`, newest first.
    fn list_audits(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> AuditResult<Vec<Audit>>;

    /// Set the sticky unlock flag. Returns false if the audit does not exist.
    fn set_audit_unlocked(&self, audit_id: &str) -> AuditResult<bool>;

    // ── Share links ──

    fn get_share(&self, audit_id: &str) -> AuditResult<Option<ShareRecord>>;

    /// Conflict-checked publish of `slug` for `audit_id`.
    fn publish_share(
        &self,
        audit_id: &str,
        slug: &str,
        at: DateTime<Utc>,
    ) -> AuditResult<PublishOutcome>;

    /// Clear slug and public flag. Returns false if there was nothing public.
    fn revoke_share(&self, audit_id: &str, at: DateTime<Utc>) -> AuditResult<bool>;

    /// Atomically count a view of a public slug. `None` if not public.
    fn record_public_view(&self, slug: &str) -> AuditResult<Option<PublicView>>;

    // ── Lifecycle ──

    fn schema_version(&self) -> AuditResult<u32>;

    fn health_check(&self) -> AuditResult<StorageHealth>;
}

// ── Arc<T> blanket impl ──

impl<T: IAuditStorage + ?Sized> IAuditStorage for Arc<T> {
    fn insert_account(&self, account: &Account) -> AuditResult<()> {
        (**self).insert_account(account)
    }
    fn get_account(&self, account_id: &str) -> AuditResult<Option<Account>> {
        (**self).get_account(account_id)
    }
    fn upsert_plan(&self, plan: &Plan) -> AuditResult<()> {
        (**self).upsert_plan(plan)
    }
    fn get_plan(&self, name: &str) -> AuditResult<Option<Plan>> {
        (**self).get_plan(name)
    }
    fn upsert_subscription(&self, subscription: &Subscription) -> AuditResult<()> {
        (**self).upsert_subscription(subscription)
    }
    fn get_subscription(&self, account_id: &str) -> AuditResult<Option<Subscription>> {
        (**self).get_subscription(account_id)
    }
    fn insert_free_grant(
        &self,
        account_id: &str,
        period: &UsagePeriod,
        granted_at: DateTime<Utc>,
    ) -> AuditResult<bool> {
        (**self).insert_free_grant(account_id, period, granted_at)
    }
    fn has_free_grant(&self, account_id: &str, period: &UsagePeriod) -> AuditResult<bool> {
        (**self).has_free_grant(account_id, period)
    }
    fn get_usage_count(&self, account_id: &str, period: &UsagePeriod) -> AuditResult<u32> {
        (**self).get_usage_count(account_id, period)
    }
    fn increment_usage(&self, account_id: &str, period: &UsagePeriod) -> AuditResult<u32> {
        (**self).increment_usage(account_id, period)
    }
    fn create_audit(
        &self,
        audit: &Audit,
        request_key: Option<&str>,
        period: &UsagePeriod,
        limit: u32,
    ) -> AuditResult<CreateAuditOutcome> {
        (**self).create_audit(audit, request_key, period, limit)
    }
    fn get_audit(&self, audit_id: &str) -> AuditResult<Option<Audit>> {
        (**self).get_audit(audit_id)
    }
    fn list_audits(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> AuditResult<Vec<Audit>> {
        (**self).list_audits(account_id, since, limit)
    }
    fn set_audit_unlocked(&self, audit_id: &str) -> AuditResult<bool> {
        (**self).set_audit_unlocked(audit_id)
    }
    fn get_share(&self, audit_id: &str) -> AuditResult<Option<ShareRecord>> {
        (**self).get_share(audit_id)
    }
    fn publish_share(
        &self,
        audit_id: &str,
        slug: &str,
        at: DateTime<Utc>,
    ) -> AuditResult<PublishOutcome> {
        (**self).publish_share(audit_id, slug, at)
    }
    fn revoke_share(&self, audit_id: &str, at: DateTime<Utc>) -> AuditResult<bool> {
        (**self).revoke_share(audit_id, at)
    }
    fn record_public_view(&self, slug: &str) -> AuditResult<Option<PublicView>> {
        (**self).record_public_view(slug)
    }
    fn schema_version(&self) -> AuditResult<u32> {
        (**self).schema_version()
    }
    fn health_check(&self) -> AuditResult<StorageHealth> {
        (**self).health_check()
    }
}
