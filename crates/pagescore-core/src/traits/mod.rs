//! Seams between the engine and its collaborators.

pub mod storage;

pub use storage::{CreateAuditOutcome, IAuditStorage, StorageHealth};
