//! Threshold rules → ordered recommendation list.
//!
//! Rules fire in a fixed order and the result is stably sorted by priority,
//! so identical inputs always produce an identical list. Rules that read
//! reach or impressions are tagged `is_pro`: only paid tiers receive that data.

use pagescore_core::types::{
    ComputedMetrics, PostsAnalysis, Priority, RawInputs, Recommendation, ScoreBreakdown,
};

use super::CADENCE_BAND;

pub const ENGAGEMENT_THRESHOLD: u8 = 50;
pub const CONSISTENCY_THRESHOLD: u8 = 50;
/// Reach below this share of followers (%) triggers reach advice.
pub const REACH_RATE_THRESHOLD: f64 = 20.0;
pub const IMPRESSIONS_PER_FOLLOWER_THRESHOLD: f64 = 1.0;
/// Shares below this fraction of interactions trigger shareability advice.
pub const SHARE_RATIO_THRESHOLD: f64 = 0.1;

fn rec(id: &str, title: &str, description: &str, priority: Priority, is_pro: bool) -> Recommendation {
    Recommendation {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        priority,
        is_pro,
    }
}

pub fn generate(
    inputs: &RawInputs,
    breakdown: &ScoreBreakdown,
    metrics: &ComputedMetrics,
    posts: &PostsAnalysis,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if breakdown.engagement < ENGAGEMENT_THRESHOLD {
        out.push(rec(
            "improve_engagement",
            "Improve engagement",
            "Posts earn few reactions relative to your audience. Ask questions and reply to comments to start conversations.",
            Priority::High,
            false,
        ));
    }

    if posts.posts_analyzed == 0 {
        out.push(rec(
            "start_posting",
            "Start posting regularly",
            "No posts were found in the analysis window. Publish at least three times a week.",
            Priority::High,
            false,
        ));
    } else if breakdown.consistency < CONSISTENCY_THRESHOLD && posts.posts_per_week < CADENCE_BAND.0 {
        out.push(rec(
            "post_more_consistently",
            "Post more consistently",
            "You post less than three times a week. A steady schedule keeps your page in followers' feeds.",
            Priority::High,
            false,
        ));
    } else if posts.posts_per_week > CADENCE_BAND.1 {
        out.push(rec(
            "reduce_posting_frequency",
            "Focus on fewer, stronger posts",
            "You post more than seven times a week. Fewer, higher quality posts tend to engage better.",
            Priority::Medium,
            false,
        ));
    }

    let checklist = inputs.checklist.unwrap_or_default();
    if !checklist.has_description {
        out.push(rec(
            "add_description",
            "Add a page description",
            "Tell visitors what your page is about in the About section.",
            Priority::Medium,
            false,
        ));
    }
    if !checklist.has_call_to_action {
        out.push(rec(
            "add_call_to_action",
            "Add a call-to-action button",
            "A button such as Contact Us or Shop Now turns visits into actions.",
            Priority::Medium,
            false,
        ));
    }
    if !checklist.has_contact_info {
        out.push(rec(
            "add_contact_info",
            "Add contact information",
            "Make it easy to reach you with a phone number, email, or address.",
            Priority::Low,
            false,
        ));
    }
    if !checklist.has_profile_photo || !checklist.has_cover_photo {
        out.push(rec(
            "complete_page_images",
            "Complete your page images",
            "Pages with both a profile photo and a cover photo look established and trustworthy.",
            Priority::Low,
            false,
        ));
    }

    if let Some(reach_rate) = metrics.reach_rate {
        if reach_rate < REACH_RATE_THRESHOLD {
            out.push(rec(
                "expand_reach",
                "Expand your organic reach",
                "Fewer than one in five followers saw your posts. Post when your audience is online and favour formats the feed promotes.",
                Priority::High,
                true,
            ));
        }
    }
    if let Some(per_follower) = metrics.impressions_per_follower {
        if per_follower < IMPRESSIONS_PER_FOLLOWER_THRESHOLD {
            out.push(rec(
                "increase_impressions",
                "Increase impressions",
                "Your content is shown less than once per follower. Reshare top posts and cross-promote them.",
                Priority::Medium,
                true,
            ));
        }
    }
    if inputs.reach.is_some() && metrics.total_interactions > 0 {
        let shares = inputs.shares.unwrap_or(0) as f64;
        if shares / (metrics.total_interactions as f64) < SHARE_RATIO_THRESHOLD {
            out.push(rec(
                "boost_shareable_content",
                "Create more shareable content",
                "Shares are the strongest reach signal and yours are low. Try tips, checklists, and local news.",
                Priority::Low,
                true,
            ));
        }
    }

    out.sort_by_key(|r| r.priority);
    out
}
