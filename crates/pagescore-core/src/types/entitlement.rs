//! Entitlement snapshot: what an account may do right now.

use serde::{Deserialize, Serialize};

use super::account::PlanLimits;

/// Capabilities gated by tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    AutoAudit,
    ExportPdf,
    ShareReport,
    ViewFullMetrics,
    ViewDemographics,
    ViewAiInsights,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Self::AutoAudit,
        Self::ExportPdf,
        Self::ShareReport,
        Self::ViewFullMetrics,
        Self::ViewDemographics,
        Self::ViewAiInsights,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoAudit => "auto_audit",
            Self::ExportPdf => "export_pdf",
            Self::ShareReport => "share_report",
            Self::ViewFullMetrics => "view_full_metrics",
            Self::ViewDemographics => "view_demographics",
            Self::ViewAiInsights => "view_ai_insights",
        }
    }
}

/// Resolved capability flags, serialized in the shape the dashboard reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    pub can_auto_audit: bool,
    pub can_export_pdf: bool,
    pub can_share_report: bool,
    pub can_view_full_metrics: bool,
    pub can_view_demographics: bool,
    #[serde(rename = "canViewAIInsights")]
    pub can_view_ai_insights: bool,
}

impl FeatureFlags {
    /// Build by asking `allowed` about each capability.
    pub fn from_fn<F>(allowed: F) -> Self
    where
        F: Fn(Capability) -> bool,
    {
        Self {
            can_auto_audit: allowed(Capability::AutoAudit),
            can_export_pdf: allowed(Capability::ExportPdf),
            can_share_report: allowed(Capability::ShareReport),
            can_view_full_metrics: allowed(Capability::ViewFullMetrics),
            can_view_demographics: allowed(Capability::ViewDemographics),
            can_view_ai_insights: allowed(Capability::ViewAiInsights),
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::AutoAudit => self.can_auto_audit,
            Capability::ExportPdf => self.can_export_pdf,
            Capability::ShareReport => self.can_share_report,
            Capability::ViewFullMetrics => self.can_view_full_metrics,
            Capability::ViewDemographics => self.can_view_demographics,
            Capability::ViewAiInsights => self.can_view_ai_insights,
        }
    }
}

/// Monthly audit usage. `remaining` never goes below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
}

impl UsageSummary {
    pub fn new(used: u32, limit: u32) -> Self {
        Self {
            used,
            limit,
            remaining: limit.saturating_sub(used),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Derived per request, never persisted or cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementSnapshot {
    pub account_id: String,
    /// Plan whose limits apply (`free` when unsubscribed).
    pub plan: String,
    /// Subscribed and paid.
    pub subscribed_pro: bool,
    /// Monthly one-time grant active for the current month.
    pub has_free_audit_grant: bool,
    /// `subscribed_pro || has_free_audit_grant`.
    pub is_pro: bool,
    pub features: FeatureFlags,
    pub limits: PlanLimits,
    pub usage: UsageSummary,
    /// Usage period key (`YYYY-MM`).
    pub period: String,
}

impl EntitlementSnapshot {
    pub fn can(&self, capability: Capability) -> bool {
        self.features.allows(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_clamps_at_zero() {
        let usage = UsageSummary::new(7, 3);
        assert_eq!(usage.remaining, 0);
        assert!(usage.is_exhausted());
        assert_eq!(UsageSummary::new(1, 3).remaining, 2);
    }

    #[test]
    fn test_flags_serialize_with_dashboard_names() {
        let flags = FeatureFlags::from_fn(|c| c == Capability::ViewAiInsights);
        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["canViewAIInsights"], true);
        assert_eq!(json["canShareReport"], false);
    }

    #[test]
    fn test_from_fn_and_allows_agree() {
        let flags = FeatureFlags::from_fn(|c| matches!(c, Capability::ExportPdf | Capability::ShareReport));
        for capability in Capability::ALL {
            let expected = matches!(capability, Capability::ExportPdf | Capability::ShareReport);
            assert_eq!(flags.allows(capability), expected, "{}", capability.as_str());
        }
    }
}
