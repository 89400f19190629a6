//! # pagescore-core
//!
//! Foundation crate for the PageScore audit subsystem.
//! Defines the shared types, the storage trait, errors, config, tracing setup,
//! and constants. Every other crate in the workspace depends on this.
//!
//! ## Modules
//! - `config`: PageScoreConfig and its TOML sections
//! - `constants`: tier names, sentinels, free-tier caps
//! - `errors`: AuditError, StorageError, error codes, RecoveryAction
//! - `tracing`: subscriber setup
//! - `traits`: `IAuditStorage`, the datastore seam
//! - `types`: accounts, audits, entitlements, reports, share links, usage periods

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::PageScoreConfig;
pub use errors::{AuditError, AuditResult, PageScoreErrorCode, RecoveryAction, StorageError};
pub use traits::IAuditStorage;
