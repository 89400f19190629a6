//! Shared data structures.

pub mod account;
pub mod audit;
pub mod caller;
pub mod entitlement;
pub mod period;
pub mod report;
pub mod share;

pub use account::{Account, Plan, PlanFlagOverrides, PlanLimits, Subscription, SubscriptionStatus};
pub use audit::{
    Audit, AuditComparison, AuditEnrichment, AuditRequest, AuditSummary, ComputedMetrics,
    PageChecklist, PostsAnalysis, Priority, RawInputs, Recommendation, ScoreBreakdown,
    ScoreResult,
};
pub use caller::Caller;
pub use entitlement::{Capability, EntitlementSnapshot, FeatureFlags, UsageSummary};
pub use period::UsagePeriod;
pub use report::{AccessLevel, LockedSection, MetricsPreview, ReportPayload, ShareState};
pub use share::{PublicView, PublishOutcome, ShareLink, ShareRecord};
