//! AuditError: the one error type that crosses crate seams.

use thiserror::Error;

use super::error_code::{self, PageScoreErrorCode};
use super::storage_error::StorageError;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Session expired: refresh credentials and retry")]
    AuthExpired,

    #[error("Account not found: {account_id}")]
    AccountNotFound { account_id: String },

    /// Missing, or owned by someone else. The two are never distinguished.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Pro entitlement required: {capability}")]
    ProRequired { capability: String },

    #[error("Monthly audit limit reached: {used} of {limit} used, {remaining} remaining")]
    LimitReached { used: u32, limit: u32, remaining: u32 },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AuditResult<T> = Result<T, AuditError>;

impl AuditError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn pro_required(capability: impl Into<String>) -> Self {
        Self::ProRequired {
            capability: capability.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    /// True for datastore failures that are worth retrying later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_transient())
    }
}

impl PageScoreErrorCode for AuditError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AuthExpired => error_code::AUTH_EXPIRED,
            // Account existence is not revealed either.
            Self::AccountNotFound { .. } | Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::ProRequired { .. } => error_code::PRO_REQUIRED,
            Self::LimitReached { .. } => error_code::LIMIT_REACHED,
            Self::Conflict { .. } => error_code::CONFLICT,
            Self::InvalidInput(_) => error_code::INVALID_INPUT,
            Self::Config(_) => error_code::CONFIG_ERROR,
            Self::Storage(e) => e.error_code(),
            Self::Serialization(_) => error_code::SERIALIZATION_ERROR,
        }
    }
}
