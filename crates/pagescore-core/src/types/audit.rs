//! Audit inputs, computed scores, and stored audits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Presence checks for a page's profile setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageChecklist {
    pub has_profile_photo: bool,
    pub has_cover_photo: bool,
    pub has_description: bool,
    pub has_contact_info: bool,
    pub has_call_to_action: bool,
}

/// Raw page counters as fetched from the page provider. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawInputs {
    pub followers: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub shares: Option<u64>,
    /// Posts published inside the analysis window.
    pub posts_analyzed: Option<u32>,
    /// Length of the analysis window. Defaults to 30 days when absent.
    pub period_days: Option<u32>,
    /// Paid-tier data.
    pub reach: Option<u64>,
    /// Paid-tier data.
    pub impressions: Option<u64>,
    pub checklist: Option<PageChecklist>,
}

impl RawInputs {
    /// True when nothing at all was supplied.
    pub fn is_empty(&self) -> bool {
        self.followers.is_none()
            && self.likes.is_none()
            && self.comments.is_none()
            && self.shares.is_none()
            && self.posts_analyzed.is_none()
            && self.reach.is_none()
            && self.impressions.is_none()
            && self.checklist.is_none()
    }

    /// likes + comments + shares, counting missing counters as zero.
    pub fn total_interactions(&self) -> u64 {
        self.likes
            .unwrap_or(0)
            .saturating_add(self.comments.unwrap_or(0))
            .saturating_add(self.shares.unwrap_or(0))
    }
}

/// An `/v1/audits` request: raw counters only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditRequest {
    pub inputs: RawInputs,
    /// Client-chosen key making retries of the same request create one audit.
    pub request_key: Option<String>,
}

/// Sections produced by the insights and demographics collaborators.
/// Only accepted on the internal listener, never from the end caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditEnrichment {
    pub demographics: Option<serde_json::Value>,
    pub ai_insights: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Stable identifier, e.g. `improve_engagement`.
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// Depends on data only paid tiers receive.
    pub is_pro: bool,
}

/// Named sub-scores, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub engagement: u8,
    pub consistency: u8,
    pub readiness: u8,
}

/// Page-level derived figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedMetrics {
    /// Interactions per post as a percentage of followers.
    pub engagement_rate: f64,
    pub total_interactions: u64,
    pub followers: u64,
    pub reach_rate: Option<f64>,
    pub impressions_per_follower: Option<f64>,
}

/// Per-post derived figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsAnalysis {
    pub posts_analyzed: u32,
    pub posts_per_week: f64,
    pub interactions_per_post: f64,
    pub likes_per_post: f64,
    pub comments_per_post: f64,
    pub shares_per_post: f64,
}

/// Output of the metrics calculator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub overall: u8,
    pub breakdown: ScoreBreakdown,
    pub metrics: ComputedMetrics,
    pub posts: PostsAnalysis,
    pub recommendations: Vec<Recommendation>,
}

impl ScoreResult {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// A stored audit. Everything but `unlocked` is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub id: String,
    pub account_id: String,
    pub inputs: RawInputs,
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    pub metrics: ComputedMetrics,
    pub posts: PostsAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub ai_insights: Option<serde_json::Value>,
    pub demographics: Option<serde_json::Value>,
    /// Sticky per-audit override, independent of the owner's subscription.
    pub unlocked: bool,
    pub created_at: DateTime<Utc>,
}

impl Audit {
    pub fn summary(&self) -> AuditSummary {
        AuditSummary {
            id: self.id.clone(),
            score: self.score,
            breakdown: self.breakdown,
            unlocked: self.unlocked,
            created_at: self.created_at,
        }
    }
}

/// History list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub id: String,
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    pub unlocked: bool,
    pub created_at: DateTime<Utc>,
}

/// Score movement from `base_id` to `other_id` (positive = improved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditComparison {
    pub base_id: String,
    pub other_id: String,
    pub overall_delta: i16,
    pub engagement_delta: i16,
    pub consistency_delta: i16,
    pub readiness_delta: i16,
}

impl AuditComparison {
    pub fn between(base: &Audit, other: &Audit) -> Self {
        let delta = |a: u8, b: u8| i16::from(b) - i16::from(a);
        Self {
            base_id: base.id.clone(),
            other_id: other.id.clone(),
            overall_delta: delta(base.score, other.score),
            engagement_delta: delta(base.breakdown.engagement, other.breakdown.engagement),
            consistency_delta: delta(base.breakdown.consistency, other.breakdown.consistency),
            readiness_delta: delta(base.breakdown.readiness, other.breakdown.readiness),
        }
    }
}
