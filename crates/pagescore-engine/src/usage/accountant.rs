//! Calendar-month (UTC) audit counting.
//!
//! Counters are moved only through the storage layer's atomic upserts. The
//! metered path couples the increment to the audit insert, so a count exists
//! for every stored audit and for nothing else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use pagescore_core::errors::AuditResult;
use pagescore_core::traits::storage::CreateAuditOutcome;
use pagescore_core::traits::IAuditStorage;
use pagescore_core::types::{Audit, UsagePeriod, UsageSummary};

/// Audits counted in the month containing the query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodUsage {
    pub used: u32,
    pub period_start: DateTime<Utc>,
    pub period: String,
}

impl PeriodUsage {
    /// Against a limit. `remaining` clamps at 0 even when `used > limit`.
    pub fn against(&self, limit: u32) -> UsageSummary {
        UsageSummary::new(self.used, limit)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UsageAccountant;

impl UsageAccountant {
    pub fn new() -> Self {
        Self
    }

    /// Unconditionally count one audit run in the current month.
    pub fn record_audit_run(
        &self,
        storage: &dyn IAuditStorage,
        account_id: &str,
        now: DateTime<Utc>,
    ) -> AuditResult<u32> {
        let period = UsagePeriod::containing(now);
        let used = storage.increment_usage(account_id, &period)?;
        info!(account_id, period = period.key(), used, "audit run recorded");
        Ok(used)
    }

    pub fn get_usage(
        &self,
        storage: &dyn IAuditStorage,
        account_id: &str,
        now: DateTime<Utc>,
    ) -> AuditResult<PeriodUsage> {
        let period = UsagePeriod::containing(now);
        let used = storage.get_usage_count(account_id, &period)?;
        Ok(PeriodUsage {
            used,
            period_start: period.start(),
            period: period.key().to_string(),
        })
    }

    /// Store `audit` and count it, only while the month's count is below `limit`.
    /// A replayed `request_key` returns the earlier audit and counts nothing.
    pub fn record_metered(
        &self,
        storage: &dyn IAuditStorage,
        audit: &Audit,
        request_key: Option<&str>,
        limit: u32,
    ) -> AuditResult<CreateAuditOutcome> {
        let period = UsagePeriod::containing(audit.created_at);
        let outcome = storage.create_audit(audit, request_key, &period, limit)?;
        if let CreateAuditOutcome::Created { used, .. } = &outcome {
            info!(
                account_id = %audit.account_id,
                audit_id = %audit.id,
                period = period.key(),
                used,
                limit,
                "audit created"
            );
        }
        Ok(outcome)
    }
}
