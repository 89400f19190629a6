//! Caller-visible report payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::audit::{ComputedMetrics, PostsAnalysis, RawInputs, Recommendation, ScoreBreakdown};

/// Sections withheld from a gated report, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockedSection {
    DetailedMetrics,
    AllRecommendations,
    PostsAnalysis,
    Demographics,
    AiInsights,
    PdfExport,
    ShareLink,
}

impl LockedSection {
    pub const ALL: [LockedSection; 7] = [
        Self::DetailedMetrics,
        Self::AllRecommendations,
        Self::PostsAnalysis,
        Self::Demographics,
        Self::AiInsights,
        Self::PdfExport,
        Self::ShareLink,
    ];
}

/// The only metrics a gated report reveals. Adding a field here widens the free preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPreview {
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Full,
    Gated,
}

/// Owner-facing share state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareState {
    pub is_public: bool,
    pub share_url: Option<String>,
    pub view_count: u64,
}

/// A report as a specific caller may see it.
///
/// Withheld fields are omitted from the JSON, not nulled. On a full report a
/// not-yet-computed section is present as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub audit_id: String,
    pub access: AccessLevel,
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    pub created_at: DateTime<Utc>,
    pub recommendations: Vec<Recommendation>,
    pub locked_sections: Vec<LockedSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_metrics_preview: Option<MetricsPreview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ComputedMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts_analysis: Option<PostsAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_metrics: Option<RawInputs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographics: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<ShareState>,
}

impl ReportPayload {
    pub fn is_full(&self) -> bool {
        self.access == AccessLevel::Full
    }
}
