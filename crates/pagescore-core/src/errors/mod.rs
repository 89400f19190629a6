//! Error taxonomy (thiserror) shared by storage, engine, and server.

pub mod audit_error;
pub mod error_code;
pub mod recovery;
pub mod storage_error;

pub use audit_error::{AuditError, AuditResult};
pub use error_code::PageScoreErrorCode;
pub use recovery::RecoveryAction;
pub use storage_error::StorageError;
