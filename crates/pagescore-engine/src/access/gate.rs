//! Audit + entitlement → caller-visible report payload.
//!
//! Effective access is `entitlement.is_pro || audit.unlocked`. The two
//! overrides feeding `is_pro` (subscription, monthly grant) and the per-audit
//! unlock stay separate inputs until this point.

use serde_json::Value;
use tracing::debug;

use pagescore_core::constants::FREE_RECOMMENDATION_LIMIT;
use pagescore_core::errors::{AuditError, AuditResult};
use pagescore_core::types::{
    AccessLevel, Audit, EntitlementSnapshot, LockedSection, MetricsPreview, ReportPayload,
    ShareState,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct ReportAccessGate;

impl ReportAccessGate {
    pub fn new() -> Self {
        Self
    }

    pub fn effective_access(&self, audit: &Audit, entitlement: &EntitlementSnapshot) -> bool {
        entitlement.is_pro || audit.unlocked
    }

    /// Ownership check. Someone else's audit is indistinguishable from a missing one.
    pub fn authorize(&self, audit: Option<Audit>, account_id: &str, audit_id: &str) -> AuditResult<Audit> {
        match audit {
            Some(audit) if audit.account_id == account_id => Ok(audit),
            _ => Err(AuditError::not_found(format!("audit {audit_id}"))),
        }
    }

    /// Gated or full payload for the owner. `share` is only consulted on full access.
    pub fn gate(
        &self,
        audit: &Audit,
        entitlement: &EntitlementSnapshot,
        share: Option<ShareState>,
    ) -> ReportPayload {
        let full = self.effective_access(audit, entitlement);
        debug!(
            audit_id = %audit.id,
            account_id = %entitlement.account_id,
            is_pro = entitlement.is_pro,
            unlocked = audit.unlocked,
            full,
            "report gated"
        );
        if full {
            self.full_payload(audit, share)
        } else {
            self.gated_payload(audit)
        }
    }

    /// Everything, with `locked_sections` empty. Sections that were never
    /// computed are present as `null` rather than omitted.
    pub fn full_payload(&self, audit: &Audit, share: Option<ShareState>) -> ReportPayload {
        ReportPayload {
            audit_id: audit.id.clone(),
            access: AccessLevel::Full,
            score: audit.score,
            breakdown: audit.breakdown,
            created_at: audit.created_at,
            recommendations: audit.recommendations.clone(),
            locked_sections: Vec::new(),
            detailed_metrics_preview: None,
            metrics: Some(audit.metrics.clone()),
            posts_analysis: Some(audit.posts.clone()),
            raw_metrics: Some(audit.inputs.clone()),
            ai_insights: Some(audit.ai_insights.clone().unwrap_or(Value::Null)),
            demographics: Some(audit.demographics.clone().unwrap_or(Value::Null)),
            share: Some(share.unwrap_or(ShareState {
                is_public: false,
                share_url: None,
                view_count: 0,
            })),
        }
    }

    /// Free view: the first non-Pro recommendations in stored order, the
    /// engagement-rate preview, and a manifest of what was withheld.
    pub fn gated_payload(&self, audit: &Audit) -> ReportPayload {
        let recommendations = audit
            .recommendations
            .iter()
            .filter(|r| !r.is_pro)
            .take(FREE_RECOMMENDATION_LIMIT)
            .cloned()
            .collect();

        ReportPayload {
            audit_id: audit.id.clone(),
            access: AccessLevel::Gated,
            score: audit.score,
            breakdown: audit.breakdown,
            created_at: audit.created_at,
            recommendations,
            locked_sections: LockedSection::ALL.to_vec(),
            detailed_metrics_preview: Some(MetricsPreview {
                engagement_rate: audit.metrics.engagement_rate,
            }),
            metrics: None,
            posts_analysis: None,
            raw_metrics: None,
            ai_insights: None,
            demographics: None,
            share: None,
        }
    }
}
