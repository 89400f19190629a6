//! AuditService: the inbound operations, composed from the components.
//!
//! Each call resolves a fresh entitlement snapshot, makes its gating decision
//! once, and returns either the gated or the full shape. Nothing is cached
//! between calls.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use pagescore_core::config::PageScoreConfig;
use pagescore_core::errors::{AuditError, AuditResult, StorageError};
use pagescore_core::traits::storage::{CreateAuditOutcome, StorageHealth};
use pagescore_core::traits::IAuditStorage;
use pagescore_core::types::{
    Account, Audit, AuditComparison, AuditEnrichment, AuditRequest, AuditSummary, Caller,
    EntitlementSnapshot, RawInputs, ReportPayload, ShareLink, Subscription, SubscriptionStatus,
    UsagePeriod, UsageSummary,
};

use crate::access::ReportAccessGate;
use crate::clock::{Clock, SystemClock};
use crate::entitlement::EntitlementResolver;
use crate::metrics::MetricsCalculator;
use crate::share::{ShareLinkManager, SlugGenerator};
use crate::usage::{PeriodUsage, UsageAccountant};

/// Most history entries returned by one `list_audits` call.
pub const HISTORY_PAGE_SIZE: usize = 100;
pub const MAX_REQUEST_KEY_LEN: usize = 128;

/// Result of `run_audit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunAuditOutcome {
    pub report: ReportPayload,
    pub usage: UsageSummary,
    /// The request key was seen before; the earlier audit was returned.
    pub replayed: bool,
}

pub struct AuditService {
    storage: Arc<dyn IAuditStorage>,
    clock: Arc<dyn Clock>,
    calculator: MetricsCalculator,
    resolver: EntitlementResolver,
    gate: ReportAccessGate,
    shares: ShareLinkManager,
    usage: UsageAccountant,
}

impl AuditService {
    pub fn new(storage: Arc<dyn IAuditStorage>, config: &PageScoreConfig) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            calculator: MetricsCalculator::new(),
            resolver: EntitlementResolver::new(config.limits.clone()),
            gate: ReportAccessGate::new(),
            shares: ShareLinkManager::new(config.share.clone()),
            usage: UsageAccountant::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_slug_generator(mut self, config: &PageScoreConfig, slugs: Arc<dyn SlugGenerator>) -> Self {
        self.shares = ShareLinkManager::with_generator(config.share.clone(), slugs);
        self
    }

    fn storage(&self) -> &dyn IAuditStorage {
        self.storage.as_ref()
    }

    // ── Accounts & billing (collaborator write paths) ──

    /// Idempotent account registration, used by the identity collaborator.
    pub fn register_account(&self, account_id: &str) -> AuditResult<Account> {
        if account_id.trim().is_empty() {
            return Err(AuditError::InvalidInput("account id must not be empty".to_string()));
        }
        if let Some(existing) = self.storage().get_account(account_id)? {
            return Ok(existing);
        }
        let account = Account {
            id: account_id.to_string(),
            created_at: self.clock.now(),
        };
        match self.storage().insert_account(&account) {
            Ok(()) => {
                info!(account_id, "account registered");
                Ok(account)
            }
            // Lost a registration race; the winner's row is just as good.
            Err(AuditError::Storage(StorageError::ConstraintViolation { .. })) => self
                .storage()
                .get_account(account_id)?
                .ok_or_else(|| AuditError::AccountNotFound {
                    account_id: account_id.to_string(),
                }),
            Err(e) => Err(e),
        }
    }

    /// Payment webhook write path. Events older than the stored state are ignored.
    pub fn apply_subscription(
        &self,
        account_id: &str,
        plan: &str,
        status: SubscriptionStatus,
        event_at: DateTime<Utc>,
    ) -> AuditResult<()> {
        if plan.trim().is_empty() {
            return Err(AuditError::InvalidInput("plan must not be empty".to_string()));
        }
        self.existing_account(account_id)?;
        self.storage().upsert_subscription(&Subscription {
            account_id: account_id.to_string(),
            plan: plan.to_string(),
            status,
            updated_at: event_at,
        })?;
        info!(account_id, plan, status = status.as_str(), "subscription applied");
        Ok(())
    }

    /// Issue this month's one-time grant. Operator path: the account is named
    /// explicitly and never taken from a caller credential. Returns false if
    /// the grant already existed.
    pub fn grant_free_month(&self, account_id: &str) -> AuditResult<bool> {
        let now = self.clock.now();
        let account = self.existing_account(account_id)?;
        let period = UsagePeriod::containing(now);
        let granted = self.storage().insert_free_grant(&account.id, &period, now)?;
        if granted {
            info!(account_id = %account.id, period = period.key(), "free month granted");
        }
        Ok(granted)
    }

    // ── Entitlements & usage ──

    pub fn entitlements(&self, caller: &Caller) -> AuditResult<EntitlementSnapshot> {
        self.resolver.resolve(self.storage(), caller, self.clock.now())
    }

    pub fn usage(&self, caller: &Caller) -> AuditResult<PeriodUsage> {
        let now = self.clock.now();
        let account = self.resolver.authenticate(self.storage(), caller, now)?;
        self.usage.get_usage(self.storage(), &account.id, now)
    }

    // ── Audits ──

    /// Score the inputs, store the audit, and count it, unless the month's
    /// allowance is used up.
    pub fn run_audit(&self, caller: &Caller, request: AuditRequest) -> AuditResult<RunAuditOutcome> {
        self.run_enriched_audit(caller, request, AuditEnrichment::default())
    }

    /// `run_audit` with collaborator-produced sections attached. Only the
    /// internal listener calls this.
    pub fn run_enriched_audit(
        &self,
        caller: &Caller,
        request: AuditRequest,
        enrichment: AuditEnrichment,
    ) -> AuditResult<RunAuditOutcome> {
        validate_request(&request)?;
        let now = self.clock.now();
        let entitlement = self.resolver.resolve(self.storage(), caller, now)?;
        let limit = entitlement.usage.limit;

        let score = self.calculator.compute(&request.inputs);
        let audit = Audit {
            id: Uuid::new_v4().to_string(),
            account_id: entitlement.account_id.clone(),
            inputs: request.inputs,
            score: score.overall,
            breakdown: score.breakdown,
            metrics: score.metrics,
            posts: score.posts,
            recommendations: score.recommendations,
            ai_insights: enrichment.ai_insights,
            demographics: enrichment.demographics,
            unlocked: false,
            created_at: now,
        };

        let outcome = self.usage.record_metered(
            self.storage(),
            &audit,
            request.request_key.as_deref(),
            limit,
        )?;

        let (stored, usage, replayed) = match outcome {
            CreateAuditOutcome::Created { audit, used } => (audit, UsageSummary::new(used, limit), false),
            CreateAuditOutcome::Replayed { audit } => (audit, entitlement.usage, true),
            CreateAuditOutcome::LimitReached { used } => {
                warn!(account_id = %entitlement.account_id, used, limit, "monthly audit limit reached");
                return Err(AuditError::LimitReached {
                    used,
                    limit,
                    remaining: limit.saturating_sub(used),
                });
            }
        };

        let report = self.report_for(&stored, &entitlement)?;
        Ok(RunAuditOutcome {
            report,
            usage,
            replayed,
        })
    }

    /// The audit as this caller may see it.
    pub fn get_report(&self, caller: &Caller, audit_id: &str) -> AuditResult<ReportPayload> {
        let entitlement = self.resolver.resolve(self.storage(), caller, self.clock.now())?;
        let audit = self.owned_audit(&entitlement.account_id, audit_id)?;
        self.report_for(&audit, &entitlement)
    }

    /// Summaries inside the entitlement's history window, newest first.
    pub fn list_audits(&self, caller: &Caller) -> AuditResult<Vec<AuditSummary>> {
        let now = self.clock.now();
        let entitlement = self.resolver.resolve(self.storage(), caller, now)?;
        let since = now
            .checked_sub_signed(Duration::days(i64::from(entitlement.limits.history_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let audits = self.storage().list_audits(
            &entitlement.account_id,
            since,
            HISTORY_PAGE_SIZE,
        )?;
        Ok(audits.iter().map(Audit::summary).collect())
    }

    /// Score movement from `base_id` to `other_id`. Both must be owned.
    ///
    /// Overall and breakdown scores are visible on every tier, so the deltas
    /// are tier-agnostic and only ownership is checked.
    pub fn compare_audits(
        &self,
        caller: &Caller,
        base_id: &str,
        other_id: &str,
    ) -> AuditResult<AuditComparison> {
        let account = self
            .resolver
            .authenticate(self.storage(), caller, self.clock.now())?;
        let base = self.owned_audit(&account.id, base_id)?;
        let other = self.owned_audit(&account.id, other_id)?;
        Ok(AuditComparison::between(&base, &other))
    }

    /// Set the sticky per-audit unlock (promo redemption). Operator path:
    /// no caller credential can flip it for their own audit.
    pub fn unlock_audit(&self, audit_id: &str) -> AuditResult<AuditSummary> {
        if !self.storage().set_audit_unlocked(audit_id)? {
            return Err(AuditError::not_found(format!("audit {audit_id}")));
        }
        let audit = self
            .storage()
            .get_audit(audit_id)?
            .ok_or_else(|| AuditError::not_found(format!("audit {audit_id}")))?;
        info!(account_id = %audit.account_id, audit_id, "audit unlocked");
        Ok(audit.summary())
    }

    // ── Share links ──

    pub fn create_share(&self, caller: &Caller, audit_id: &str) -> AuditResult<ShareLink> {
        let now = self.clock.now();
        let entitlement = self.resolver.resolve(self.storage(), caller, now)?;
        let audit = self.owned_audit(&entitlement.account_id, audit_id)?;
        self.shares.create(self.storage(), &audit, &entitlement, now)
    }

    /// Not Pro-gated: an owner whose subscription lapsed can still take a link down.
    pub fn revoke_share(&self, caller: &Caller, audit_id: &str) -> AuditResult<bool> {
        let now = self.clock.now();
        let account = self.resolver.authenticate(self.storage(), caller, now)?;
        let audit = self.owned_audit(&account.id, audit_id)?;
        self.shares.revoke(self.storage(), &audit, now)
    }

    pub fn public_report(&self, slug: &str) -> AuditResult<ReportPayload> {
        self.shares.public_report(self.storage(), slug)
    }

    pub fn health(&self) -> AuditResult<StorageHealth> {
        self.storage().health_check()
    }

    // ── helpers ──

    fn existing_account(&self, account_id: &str) -> AuditResult<Account> {
        self.storage()
            .get_account(account_id)?
            .ok_or_else(|| AuditError::AccountNotFound {
                account_id: account_id.to_string(),
            })
    }

    fn owned_audit(&self, account_id: &str, audit_id: &str) -> AuditResult<Audit> {
        let audit = self.storage().get_audit(audit_id)?;
        self.gate.authorize(audit, account_id, audit_id)
    }

    fn report_for(&self, audit: &Audit, entitlement: &EntitlementSnapshot) -> AuditResult<ReportPayload> {
        let share = if self.gate.effective_access(audit, entitlement) {
            let record = self.storage().get_share(&audit.id)?;
            Some(self.shares.state_of(record.as_ref()))
        } else {
            None
        };
        Ok(self.gate.gate(audit, entitlement, share))
    }
}

fn validate_request(request: &AuditRequest) -> AuditResult<()> {
    if let Some(key) = &request.request_key {
        if key.is_empty() || key.len() > MAX_REQUEST_KEY_LEN {
            return Err(AuditError::InvalidInput(format!(
                "request_key must be 1-{MAX_REQUEST_KEY_LEN} characters"
            )));
        }
    }
    validate_inputs(&request.inputs)
}

fn validate_inputs(inputs: &RawInputs) -> AuditResult<()> {
    if inputs.period_days == Some(0) {
        return Err(AuditError::InvalidInput("period_days must be positive".to_string()));
    }
    Ok(())
}
