//! # pagescore-engine
//!
//! The entitlement-gated audit pipeline.
//!
//! ## Components
//! - `metrics`: MetricsCalculator: raw page counters → scores + recommendations
//! - `entitlement`: EntitlementResolver: account → fresh EntitlementSnapshot
//! - `access`: ReportAccessGate: the single free/Pro decision point for report payloads
//! - `share`: ShareLinkManager + slug generation
//! - `usage`: UsageAccountant: monthly audit counters
//! - `service`: AuditService, the facade the HTTP adapter calls
//!
//! Every operation takes the storage handle and caller explicitly; nothing
//! reads ambient "current user" state.

pub mod access;
pub mod clock;
pub mod entitlement;
pub mod metrics;
pub mod service;
pub mod share;
pub mod usage;

pub use access::ReportAccessGate;
pub use clock::{Clock, FixedClock, SystemClock};
pub use entitlement::EntitlementResolver;
pub use metrics::MetricsCalculator;
pub use service::{AuditService, RunAuditOutcome};
pub use share::{RandomSlugGenerator, ShareLinkManager, SlugGenerator};
pub use usage::{PeriodUsage, UsageAccountant};
