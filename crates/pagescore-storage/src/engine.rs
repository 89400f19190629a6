//! AuditStorageEngine: implements IAuditStorage over a ConnectionPool.
//!
//! Writes are serialized through the pool's single writer connection.
//! Reads go through the round-robin reader pool (writer in in-memory mode).

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use pagescore_core::errors::AuditResult;
use pagescore_core::traits::storage::{CreateAuditOutcome, StorageHealth};
use pagescore_core::traits::IAuditStorage;
use pagescore_core::types::{
    Account, Audit, Plan, PublicView, PublishOutcome, ShareRecord, Subscription, UsagePeriod,
};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{accounts, audits, shares, usage};
use crate::to_storage_err;

pub struct AuditStorageEngine {
    pool: ConnectionPool,
}

impl AuditStorageEngine {
    /// Open a file-backed database, running pending migrations on the writer.
    pub fn open(path: &Path, read_pool_size: usize) -> AuditResult<Self> {
        let pool = ConnectionPool::open(path, read_pool_size, |conn| {
            migrations::migrate(conn).map(|_| ())
        })?;
        info!(
            path = %path.display(),
            readers = pool.reader_count(),
            "audit storage opened"
        );
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> AuditResult<Self> {
        let pool = ConnectionPool::open_in_memory(|conn| migrations::migrate(conn).map(|_| ()))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

impl IAuditStorage for AuditStorageEngine {
    fn insert_account(&self, account: &Account) -> AuditResult<()> {
        self.pool
            .with_writer(|conn| accounts::insert_account(conn, account))
    }

    fn get_account(&self, account_id: &str) -> AuditResult<Option<Account>> {
        self.pool
            .with_reader(|conn| accounts::get_account(conn, account_id))
    }

    fn upsert_plan(&self, plan: &Plan) -> AuditResult<()> {
        self.pool.with_writer(|conn| accounts::upsert_plan(conn, plan))
    }

    fn get_plan(&self, name: &str) -> AuditResult<Option<Plan>> {
        self.pool.with_reader(|conn| accounts::get_plan(conn, name))
    }

    fn upsert_subscription(&self, subscription: &Subscription) -> AuditResult<()> {
        self.pool
            .with_writer(|conn| accounts::upsert_subscription(conn, subscription))
    }

    fn get_subscription(&self, account_id: &str) -> AuditResult<Option<Subscription>> {
        self.pool
            .with_reader(|conn| accounts::get_subscription(conn, account_id))
    }

    fn insert_free_grant(
        &self,
        account_id: &str,
        period: &UsagePeriod,
        granted_at: DateTime<Utc>,
    ) -> AuditResult<bool> {
        self.pool
            .with_writer(|conn| accounts::insert_free_grant(conn, account_id, period, granted_at))
    }

    fn has_free_grant(&self, account_id: &str, period: &UsagePeriod) -> AuditResult<bool> {
        self.pool
            .with_reader(|conn| accounts::has_free_grant(conn, account_id, period))
    }

    fn get_usage_count(&self, account_id: &str, period: &UsagePeriod) -> AuditResult<u32> {
        self.pool
            .with_reader(|conn| usage::get_usage_count(conn, account_id, period))
    }

    fn increment_usage(&self, account_id: &str, period: &UsagePeriod) -> AuditResult<u32> {
        self.pool
            .with_writer(|conn| usage::increment_usage(conn, account_id, period))
    }

    fn create_audit(
        &self,
        audit: &Audit,
        request_key: Option<&str>,
        period: &UsagePeriod,
        limit: u32,
    ) -> AuditResult<CreateAuditOutcome> {
        self.pool.with_writer(|conn| {
            audits::create_metered(conn, audit, request_key, period, limit)
        })
    }

    fn get_audit(&self, audit_id: &str) -> AuditResult<Option<Audit>> {
        self.pool.with_reader(|conn| audits::get_audit(conn, audit_id))
    }

    fn list_audits(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> AuditResult<Vec<Audit>> {
        self.pool
            .with_reader(|conn| audits::list_audits(conn, account_id, since, limit))
    }

    fn set_audit_unlocked(&self, audit_id: &str) -> AuditResult<bool> {
        self.pool.with_writer(|conn| audits::set_unlocked(conn, audit_id))
    }

    fn get_share(&self, audit_id: &str) -> AuditResult<Option<ShareRecord>> {
        self.pool.with_reader(|conn| shares::get_share(conn, audit_id))
    }

    fn publish_share(
        &self,
        audit_id: &str,
        slug: &str,
        at: DateTime<Utc>,
    ) -> AuditResult<PublishOutcome> {
        self.pool
            .with_writer(|conn| shares::publish(conn, audit_id, slug, at))
    }

    fn revoke_share(&self, audit_id: &str, at: DateTime<Utc>) -> AuditResult<bool> {
        self.pool.with_writer(|conn| shares::revoke(conn, audit_id, at))
    }

    fn record_public_view(&self, slug: &str) -> AuditResult<Option<PublicView>> {
        self.pool.with_writer(|conn| shares::record_view(conn, slug))
    }

    fn schema_version(&self) -> AuditResult<u32> {
        self.pool.with_reader(migrations::get_schema_version)
    }

    fn health_check(&self) -> AuditResult<StorageHealth> {
        let connected = self.pool.with_reader(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(to_storage_err)
        })? == 1;
        Ok(StorageHealth {
            connected,
            wal_mode: self.pool.is_wal_mode(),
            schema_version: self.schema_version()?,
        })
    }
}
