//! Stable machine-readable error codes, surfaced in API error bodies.

pub const AUTH_EXPIRED: &str = "AUTH_EXPIRED";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const PRO_REQUIRED: &str = "PRO_REQUIRED";
pub const LIMIT_REACHED: &str = "LIMIT_REACHED";
pub const CONFLICT: &str = "CONFLICT";
pub const INVALID_INPUT: &str = "INVALID_INPUT";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const STORAGE_UNAVAILABLE: &str = "STORAGE_UNAVAILABLE";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";

/// Implemented by every error type that can reach an API boundary.
pub trait PageScoreErrorCode {
    fn error_code(&self) -> &'static str;
}
