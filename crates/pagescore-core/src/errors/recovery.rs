//! RecoveryAction: what the caller should do when an operation fails.

use std::fmt;

use super::{AuditError, StorageError};

/// Recommended recovery action for a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Refresh the credential and retry silently once, then prompt for re-login.
    RefreshCredential,
    /// Render a generic "not found".
    ShowNotFound,
    /// Render an upgrade prompt, not an error page.
    Upsell,
    /// Retry the whole operation once (lost race, slug collisions, busy database).
    RetryOnce,
    /// Cannot be handled by the caller.
    Escalate,
}

impl RecoveryAction {
    /// Determine the recommended recovery action for an AuditError.
    pub fn for_error(error: &AuditError) -> Self {
        match error {
            AuditError::AuthExpired => Self::RefreshCredential,

            AuditError::AccountNotFound { .. } | AuditError::NotFound { .. } => Self::ShowNotFound,

            AuditError::ProRequired { .. } | AuditError::LimitReached { .. } => Self::Upsell,

            AuditError::Conflict { .. } => Self::RetryOnce,
            AuditError::Storage(StorageError::Busy) => Self::RetryOnce,

            AuditError::InvalidInput(_)
            | AuditError::Config(_)
            | AuditError::Storage(_)
            | AuditError::Serialization(_) => Self::Escalate,
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RefreshCredential => write!(f, "RefreshCredential"),
            Self::ShowNotFound => write!(f, "ShowNotFound"),
            Self::Upsell => write!(f, "Upsell"),
            Self::RetryOnce => write!(f, "RetryOnce"),
            Self::Escalate => write!(f, "Escalate"),
        }
    }
}
