//! Plan fallbacks used when the datastore has no plan row for an account.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_FREE_AUDITS_PER_MONTH;
use crate::types::PlanLimits;

/// `[limits]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LimitsConfig {
    /// Audits per calendar month without a plan. Default: 3.
    pub free_audits_per_month: Option<u32>,
    /// PDF exports per month without a plan. Default: 0.
    pub free_pdf_exports: Option<u32>,
    /// Days of audit history visible without a plan. Default: 30.
    pub free_history_days: Option<u32>,
    /// PDF exports while a monthly free grant is active. Default: 10.
    pub grant_pdf_exports: Option<u32>,
    /// Days of history visible while a monthly free grant is active. Default: 365.
    pub grant_history_days: Option<u32>,
}

impl LimitsConfig {
    /// Limits for an account with no plan row.
    pub fn free_plan_limits(&self) -> PlanLimits {
        PlanLimits {
            audits_per_month: self
                .free_audits_per_month
                .unwrap_or(DEFAULT_FREE_AUDITS_PER_MONTH),
            pdf_exports: self.free_pdf_exports.unwrap_or(0),
            history_days: self.free_history_days.unwrap_or(30),
        }
    }

    pub fn effective_grant_pdf_exports(&self) -> u32 {
        self.grant_pdf_exports.unwrap_or(10)
    }

    pub fn effective_grant_history_days(&self) -> u32 {
        self.grant_history_days.unwrap_or(365)
    }
}
