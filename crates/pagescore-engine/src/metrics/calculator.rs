//! Raw counters → sub-scores → overall score.

use pagescore_core::types::{
    ComputedMetrics, PageChecklist, PostsAnalysis, RawInputs, ScoreBreakdown, ScoreResult,
};

use super::recommendations;
use super::{
    round2, to_score, CADENCE_BAND, CALL_TO_ACTION_WEIGHT, CONSISTENCY_WEIGHT, CONTACT_INFO_WEIGHT,
    COVER_PHOTO_WEIGHT, DEFAULT_PERIOD_DAYS, DESCRIPTION_WEIGHT, ENGAGEMENT_WEIGHT,
    OVERPOSTING_FLOOR, OVERPOSTING_PENALTY, PROFILE_PHOTO_WEIGHT, READINESS_WEIGHT,
    TARGET_ENGAGEMENT_RATE,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Score a page. Entirely absent inputs yield `ScoreResult::zero()`;
    /// partially absent inputs zero only the sub-scores that need them.
    pub fn compute(&self, inputs: &RawInputs) -> ScoreResult {
        if inputs.is_empty() {
            return ScoreResult::zero();
        }

        let metrics = compute_metrics(inputs);
        let posts = analyze_posts(inputs);

        let breakdown = ScoreBreakdown {
            engagement: engagement_score(metrics.engagement_rate),
            consistency: consistency_score(posts.posts_analyzed, posts.posts_per_week),
            readiness: readiness_score(inputs.checklist.as_ref()),
        };
        let overall = overall_score(&breakdown);
        let recommendations = recommendations::generate(inputs, &breakdown, &metrics, &posts);

        ScoreResult {
            overall,
            breakdown,
            metrics,
            posts,
            recommendations,
        }
    }
}

/// Interactions per post as a percentage of followers. 0 without followers.
pub fn engagement_rate(inputs: &RawInputs) -> f64 {
    let followers = inputs.followers.unwrap_or(0);
    if followers == 0 {
        return 0.0;
    }
    let posts = inputs.posts_analyzed.unwrap_or(0).max(1);
    inputs.total_interactions() as f64 / f64::from(posts) / followers as f64 * 100.0
}

pub fn engagement_score(rate: f64) -> u8 {
    to_score(rate / TARGET_ENGAGEMENT_RATE * 100.0)
}

/// Full marks inside the cadence band, proportional below it, decaying above it.
pub fn consistency_score(posts_analyzed: u32, posts_per_week: f64) -> u8 {
    if posts_analyzed == 0 {
        return 0;
    }
    let (low, high) = CADENCE_BAND;
    let raw = if posts_per_week < low {
        posts_per_week / low * 100.0
    } else if posts_per_week <= high {
        100.0
    } else {
        (100.0 - (posts_per_week - high) * OVERPOSTING_PENALTY).max(OVERPOSTING_FLOOR)
    };
    to_score(raw)
}

pub fn readiness_score(checklist: Option<&PageChecklist>) -> u8 {
    let Some(c) = checklist else {
        return 0;
    };
    let weighted = [
        (c.has_profile_photo, PROFILE_PHOTO_WEIGHT),
        (c.has_cover_photo, COVER_PHOTO_WEIGHT),
        (c.has_description, DESCRIPTION_WEIGHT),
        (c.has_contact_info, CONTACT_INFO_WEIGHT),
        (c.has_call_to_action, CALL_TO_ACTION_WEIGHT),
    ];
    let sum: u32 = weighted
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, weight)| u32::from(*weight))
        .sum();
    sum.min(100) as u8
}

pub fn overall_score(breakdown: &ScoreBreakdown) -> u8 {
    to_score(
        f64::from(breakdown.engagement) * ENGAGEMENT_WEIGHT
            + f64::from(breakdown.consistency) * CONSISTENCY_WEIGHT
            + f64::from(breakdown.readiness) * READINESS_WEIGHT,
    )
}

fn compute_metrics(inputs: &RawInputs) -> ComputedMetrics {
    let followers = inputs.followers.unwrap_or(0);
    let per_follower = |value: Option<u64>, scale: f64| {
        value
            .filter(|_| followers > 0)
            .map(|v| round2(v as f64 / followers as f64 * scale))
    };
    ComputedMetrics {
        engagement_rate: round2(engagement_rate(inputs)),
        total_interactions: inputs.total_interactions(),
        followers,
        reach_rate: per_follower(inputs.reach, 100.0),
        impressions_per_follower: per_follower(inputs.impressions, 1.0),
    }
}

fn analyze_posts(inputs: &RawInputs) -> PostsAnalysis {
    let posts = inputs.posts_analyzed.unwrap_or(0);
    let days = match inputs.period_days {
        Some(d) if d > 0 => d,
        _ => DEFAULT_PERIOD_DAYS,
    };
    let per_post = |count: Option<u64>| {
        if posts == 0 {
            0.0
        } else {
            round2(count.unwrap_or(0) as f64 / f64::from(posts))
        }
    };
    PostsAnalysis {
        posts_analyzed: posts,
        posts_per_week: round2(f64::from(posts) * 7.0 / f64::from(days)),
        interactions_per_post: per_post(Some(inputs.total_interactions())),
        likes_per_post: per_post(inputs.likes),
        comments_per_post: per_post(inputs.comments),
        shares_per_post: per_post(inputs.shares),
    }
}
