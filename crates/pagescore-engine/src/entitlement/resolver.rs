//! Fresh-per-request entitlement resolution.
//!
//! Subscription state can be flipped at any moment by the payment webhook,
//! so a snapshot is never cached past the request that built it.
//! When the subscription or grant lookup times out, the account is treated
//! as free tier.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use pagescore_core::config::LimitsConfig;
use pagescore_core::constants::{FREE_TIER, UNLIMITED_AUDITS};
use pagescore_core::errors::{AuditError, AuditResult, StorageError};
use pagescore_core::traits::IAuditStorage;
use pagescore_core::types::{
    Account, Caller, EntitlementSnapshot, FeatureFlags, Plan, PlanFlagOverrides, PlanLimits,
    UsagePeriod, UsageSummary,
};

#[derive(Debug, Clone, Default)]
pub struct EntitlementResolver {
    limits: LimitsConfig,
}

/// A lookup that did not return degrades to "nothing granted".
fn fail_closed<T>(
    result: AuditResult<Option<T>>,
    account_id: &str,
    lookup: &'static str,
) -> AuditResult<Option<T>> {
    match result {
        Err(AuditError::Storage(StorageError::Unavailable { reason })) => {
            warn!(account_id, lookup, %reason, "lookup unavailable, treating account as free tier");
            Ok(None)
        }
        other => other,
    }
}

impl EntitlementResolver {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Reject stale credentials, then require the account to exist.
    pub fn authenticate(
        &self,
        storage: &dyn IAuditStorage,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> AuditResult<Account> {
        if caller.is_expired(now) {
            return Err(AuditError::AuthExpired);
        }
        storage
            .get_account(&caller.account_id)?
            .ok_or_else(|| AuditError::AccountNotFound {
                account_id: caller.account_id.clone(),
            })
    }

    pub fn resolve(
        &self,
        storage: &dyn IAuditStorage,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> AuditResult<EntitlementSnapshot> {
        let account = self.authenticate(storage, caller, now)?;
        let account_id = account.id.as_str();
        let period = UsagePeriod::containing(now);

        let subscription = fail_closed(storage.get_subscription(account_id), account_id, "subscription")?;
        let subscribed_pro = subscription
            .as_ref()
            .is_some_and(|s| s.is_paid_and_active());
        let plan_name = match &subscription {
            Some(s) if s.status.is_active() => s.plan.clone(),
            _ => FREE_TIER.to_string(),
        };
        let plan = self.plan_for(storage, &plan_name)?;

        let has_free_audit_grant = fail_closed(
            storage.has_free_grant(account_id, &period).map(|granted| granted.then_some(())),
            account_id,
            "free_grant",
        )?
        .is_some();

        let is_pro = subscribed_pro || has_free_audit_grant;
        let limits = if has_free_audit_grant {
            self.grant_limits(&plan.limits)
        } else {
            plan.limits
        };

        let used = storage.get_usage_count(account_id, &period)?;
        let usage = UsageSummary::new(used, limits.audits_per_month);

        let overrides = plan.overrides;
        let features = FeatureFlags::from_fn(|c| is_pro || overrides.get(c).unwrap_or(false));

        debug!(
            account_id,
            plan = %plan.name,
            subscribed_pro,
            has_free_audit_grant,
            used = usage.used,
            limit = usage.limit,
            "entitlement resolved"
        );

        Ok(EntitlementSnapshot {
            account_id: account_id.to_string(),
            plan: plan.name,
            subscribed_pro,
            has_free_audit_grant,
            is_pro,
            features,
            limits,
            usage,
            period: period.key().to_string(),
        })
    }

    /// The plan row, or a built-in fallback when the datastore has none.
    fn plan_for(&self, storage: &dyn IAuditStorage, name: &str) -> AuditResult<Plan> {
        if let Some(plan) = storage.get_plan(name)? {
            return Ok(plan);
        }
        let limits = if name == FREE_TIER {
            self.limits.free_plan_limits()
        } else {
            // A paid tier the catalogue does not know yet is at least Pro-equivalent.
            self.grant_limits(&self.limits.free_plan_limits())
        };
        Ok(Plan {
            name: name.to_string(),
            limits,
            overrides: PlanFlagOverrides::default(),
        })
    }

    /// Pro-equivalent limits: unlimited audits, never fewer exports or history days than the plan.
    fn grant_limits(&self, base: &PlanLimits) -> PlanLimits {
        PlanLimits {
            audits_per_month: UNLIMITED_AUDITS,
            pdf_exports: base.pdf_exports.max(self.limits.effective_grant_pdf_exports()),
            history_days: base.history_days.max(self.limits.effective_grant_history_days()),
        }
    }
}
