//! Accounts, plans, and subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entitlement::Capability;
use crate::constants::FREE_TIER;

/// The billing entity a user acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Numeric allowances of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub audits_per_month: u32,
    pub pdf_exports: u32,
    pub history_days: u32,
}

/// Explicit per-plan capability grants. `None` means "not granted by the plan".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFlagOverrides {
    pub can_auto_audit: Option<bool>,
    pub can_export_pdf: Option<bool>,
    pub can_share_report: Option<bool>,
    pub can_view_full_metrics: Option<bool>,
    pub can_view_demographics: Option<bool>,
    pub can_view_ai_insights: Option<bool>,
}

impl PlanFlagOverrides {
    pub fn get(&self, capability: Capability) -> Option<bool> {
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

/// A billing tier and its allowances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub limits: PlanLimits,
    #[serde(default)]
    pub overrides: PlanFlagOverrides,
}

impl Plan {
    pub fn is_free(&self) -> bool {
        self.name == FREE_TIER
    }
}

/// Subscription state as last reported by the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    /// Whether the subscription currently confers its plan.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "trialing" => Some(Self::Trialing),
            "past_due" => Some(Self::PastDue),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }
}

/// One record per account; the payment webhook overwrites it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub account_id: String,
    pub plan: String,
    pub status: SubscriptionStatus,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Subscribed AND on a tier other than the free one.
    pub fn is_paid_and_active(&self) -> bool {
        self.status.is_active() && self.plan != FREE_TIER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(plan: &str, status: SubscriptionStatus) -> Subscription {
        Subscription {
            account_id: "acct".to_string(),
            plan: plan.to_string(),
            status,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_active_free_subscription_is_not_paid() {
        assert!(!sub(FREE_TIER, SubscriptionStatus::Active).is_paid_and_active());
        assert!(sub("pro", SubscriptionStatus::Active).is_paid_and_active());
        assert!(sub("pro", SubscriptionStatus::Trialing).is_paid_and_active());
        assert!(!sub("pro", SubscriptionStatus::PastDue).is_paid_and_active());
        assert!(!sub("pro", SubscriptionStatus::Canceled).is_paid_and_active());
    }

    #[test]
    fn test_status_strings_round_trip() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::Trialing,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Canceled,
        ] {
            assert_eq!(SubscriptionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SubscriptionStatus::parse("paused"), None);
    }
}
