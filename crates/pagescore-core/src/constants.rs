//! Fixed values shared across crates.

/// Billing tier name that never counts as a paid subscription.
pub const FREE_TIER: &str = "free";

/// Monthly audit allowance when an account has no plan row.
pub const DEFAULT_FREE_AUDITS_PER_MONTH: u32 = 3;

/// Stand-in for "unlimited" in usage responses. Must stay representable as a plain integer.
pub const UNLIMITED_AUDITS: u32 = 999_999;

/// Maximum number of recommendations shown on a gated report.
pub const FREE_RECOMMENDATION_LIMIT: usize = 2;

/// Format of a usage period key (`2026-10`).
pub const PERIOD_KEY_FORMAT: &str = "%Y-%m";
