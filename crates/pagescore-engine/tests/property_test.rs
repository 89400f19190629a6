//! Property tests for the calculator bounds and the free-tier gate.

use proptest::prelude::*;

use chrono::{TimeZone, Utc};
use pagescore_core::types::{
    Audit, EntitlementSnapshot, FeatureFlags, PageChecklist, PlanLimits, Priority, RawInputs,
    Recommendation, UsageSummary,
};
use pagescore_engine::{MetricsCalculator, ReportAccessGate};

// =============================================================================
// Strategy helpers
// =============================================================================

fn checklist_strategy() -> impl Strategy<Value = PageChecklist> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(p, c, d, i, a)| PageChecklist {
            has_profile_photo: p,
            has_cover_photo: c,
            has_description: d,
            has_contact_info: i,
            has_call_to_action: a,
        },
    )
}

fn inputs_strategy() -> impl Strategy<Value = RawInputs> {
    (
        proptest::option::of(0u64..10_000_000),
        proptest::option::of(0u64..1_000_000),
        proptest::option::of(0u64..1_000_000),
        proptest::option::of(0u64..1_000_000),
        proptest::option::of(0u32..2_000),
        proptest::option::of(1u32..366),
        proptest::option::of(0u64..50_000_000),
        proptest::option::of(0u64..50_000_000),
        proptest::option::of(checklist_strategy()),
    )
        .prop_map(
            |(followers, likes, comments, shares, posts, days, reach, impressions, checklist)| {
                RawInputs {
                    followers,
                    likes,
                    comments,
                    shares,
                    posts_analyzed: posts,
                    period_days: days,
                    reach,
                    impressions,
                    checklist,
                }
            },
        )
}

fn recommendation_strategy() -> impl Strategy<Value = Recommendation> {
    ("[a-z_]{3,12}", any::<bool>()).prop_map(|(id, is_pro)| Recommendation {
        title: id.clone(),
        id,
        description: String::new(),
        priority: Priority::Medium,
        is_pro,
    })
}

fn free_snapshot() -> EntitlementSnapshot {
    EntitlementSnapshot {
        account_id: "acct".to_string(),
        plan: "free".to_string(),
        subscribed_pro: false,
        has_free_audit_grant: false,
        is_pro: false,
        features: FeatureFlags::default(),
        limits: PlanLimits {
            audits_per_month: 3,
            pdf_exports: 0,
            history_days: 30,
        },
        usage: UsageSummary::new(0, 3),
        period: "2026-10".to_string(),
    }
}

fn audit_with(recommendations: Vec<Recommendation>, unlocked: bool) -> Audit {
    Audit {
        id: "aud".to_string(),
        account_id: "acct".to_string(),
        inputs: RawInputs::default(),
        score: 0,
        breakdown: Default::default(),
        metrics: Default::default(),
        posts: Default::default(),
        recommendations,
        ai_insights: None,
        demographics: None,
        unlocked,
        created_at: Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
    }
}

// =============================================================================
// MetricsCalculator
// =============================================================================

proptest! {
    #[test]
    fn test_scores_stay_within_bounds(inputs in inputs_strategy()) {
        let result = MetricsCalculator::new().compute(&inputs);
        prop_assert!(result.overall <= 100);
        prop_assert!(result.breakdown.engagement <= 100);
        prop_assert!(result.breakdown.consistency <= 100);
        prop_assert!(result.breakdown.readiness <= 100);
    }

    #[test]
    fn test_zero_followers_means_zero_engagement(mut inputs in inputs_strategy()) {
        inputs.followers = Some(0);
        let result = MetricsCalculator::new().compute(&inputs);
        prop_assert_eq!(result.breakdown.engagement, 0);
    }

    #[test]
    fn test_compute_is_deterministic(inputs in inputs_strategy()) {
        let calculator = MetricsCalculator::new();
        let first = serde_json::to_string(&calculator.compute(&inputs)).unwrap();
        let second = serde_json::to_string(&calculator.compute(&inputs)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_zero_posts_means_zero_consistency(mut inputs in inputs_strategy()) {
        inputs.posts_analyzed = Some(0);
        let result = MetricsCalculator::new().compute(&inputs);
        prop_assert_eq!(result.breakdown.consistency, 0);
    }
}

// =============================================================================
// ReportAccessGate
// =============================================================================

proptest! {
    #[test]
    fn test_free_view_is_a_short_non_pro_prefix(recs in prop::collection::vec(recommendation_strategy(), 0..12)) {
        let audit = audit_with(recs.clone(), false);
        let payload = ReportAccessGate::new().gate(&audit, &free_snapshot(), None);

        prop_assert!(payload.recommendations.len() <= 2);
        prop_assert!(payload.recommendations.iter().all(|r| !r.is_pro));
        let expected: Vec<_> = recs.into_iter().filter(|r| !r.is_pro).take(2).collect();
        prop_assert_eq!(payload.recommendations, expected);
    }

    #[test]
    fn test_unlocked_view_is_complete(recs in prop::collection::vec(recommendation_strategy(), 0..12)) {
        let audit = audit_with(recs.clone(), true);
        let payload = ReportAccessGate::new().gate(&audit, &free_snapshot(), None);
        prop_assert!(payload.locked_sections.is_empty());
        prop_assert_eq!(payload.recommendations, recs);
    }
}
