//! UsageAccountant: monthly audit counters.

pub mod accountant;

pub use accountant::{PeriodUsage, UsageAccountant};
