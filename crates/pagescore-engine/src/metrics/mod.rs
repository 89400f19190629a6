//! MetricsCalculator: deterministic page-health scoring.
//!
//! Pure functions only. No clock, no randomness, no I/O, so two audits over
//! the same inputs always compare equal.

pub mod calculator;
pub mod recommendations;

pub use calculator::MetricsCalculator;

/// Sub-score weights of the overall score. Sum to 1.0.
pub const ENGAGEMENT_WEIGHT: f64 = 0.5;
pub const CONSISTENCY_WEIGHT: f64 = 0.3;
pub const READINESS_WEIGHT: f64 = 0.2;

/// Engagement rate (%) that earns a full engagement sub-score.
pub const TARGET_ENGAGEMENT_RATE: f64 = 3.0;

/// Posts per week considered healthy, inclusive.
pub const CADENCE_BAND: (f64, f64) = (3.0, 7.0);
/// Points lost per weekly post above the band.
pub const OVERPOSTING_PENALTY: f64 = 5.0;
/// Lowest consistency score an over-posting page can fall to.
pub const OVERPOSTING_FLOOR: f64 = 40.0;

/// Analysis window when the inputs do not name one.
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// Readiness checklist weights. Sum to 100.
pub const PROFILE_PHOTO_WEIGHT: u8 = 20;
pub const COVER_PHOTO_WEIGHT: u8 = 15;
pub const DESCRIPTION_WEIGHT: u8 = 25;
pub const CONTACT_INFO_WEIGHT: u8 = 20;
pub const CALL_TO_ACTION_WEIGHT: u8 = 20;

/// Round a raw score into [0, 100]. Non-finite values score 0.
pub(crate) fn to_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Two decimal places, for display figures.
pub(crate) fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}
