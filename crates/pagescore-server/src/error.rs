//! AuditError → HTTP status + `{ "error", "code" }` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use pagescore_core::errors::{AuditError, PageScoreErrorCode};

#[derive(Debug)]
pub enum ApiError {
    Audit(AuditError),
    /// No `x-account-id` header: the request never passed the auth collaborator.
    MissingIdentity,
    /// A blocking task panicked or was cancelled.
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AuditError> for ApiError {
    fn from(e: AuditError) -> Self {
        Self::Audit(e)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
}

impl ErrorBody {
    fn new(error: String, code: &'static str) -> Self {
        Self {
            error,
            code,
            used: None,
            limit: None,
            remaining: None,
        }
    }
}

pub fn status_for(e: &AuditError) -> StatusCode {
    match e {
        AuditError::AuthExpired => StatusCode::UNAUTHORIZED,
        AuditError::NotFound { .. } | AuditError::AccountNotFound { .. } => StatusCode::NOT_FOUND,
        AuditError::ProRequired { .. } => StatusCode::PAYMENT_REQUIRED,
        AuditError::LimitReached { .. } => StatusCode::TOO_MANY_REQUESTS,
        AuditError::Conflict { .. } => StatusCode::CONFLICT,
        AuditError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AuditError::Config(_) | AuditError::Storage(_) | AuditError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn body_for(e: &AuditError) -> ErrorBody {
    match e {
        // Account existence is not revealed.
        AuditError::AccountNotFound { .. } => ErrorBody::new("Not found".to_string(), e.error_code()),
        AuditError::LimitReached {
            used,
            limit,
            remaining,
        } => ErrorBody {
            used: Some(*used),
            limit: Some(*limit),
            remaining: Some(*remaining),
            ..ErrorBody::new(e.to_string(), e.error_code())
        },
        AuditError::Config(_) | AuditError::Storage(_) | AuditError::Serialization(_) => {
            ErrorBody::new("Internal server error".to_string(), e.error_code())
        }
        _ => ErrorBody::new(e.to_string(), e.error_code()),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Audit(e) => {
                let status = status_for(e);
                if status.is_server_error() {
                    error!(error = %e, code = e.error_code(), "request failed");
                }
                (status, body_for(e))
            }
            ApiError::MissingIdentity => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Missing caller identity".to_string(), "UNAUTHENTICATED"),
            ),
            ApiError::Internal(message) => {
                error!(%message, "request task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal server error".to_string(), "INTERNAL_ERROR"),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagescore_core::errors::StorageError;

    #[test]
    fn test_taxonomy_maps_to_statuses() {
        let cases = [
            (AuditError::AuthExpired, StatusCode::UNAUTHORIZED),
            (AuditError::not_found("audit x"), StatusCode::NOT_FOUND),
            (
                AuditError::AccountNotFound {
                    account_id: "a".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (AuditError::pro_required("share_report"), StatusCode::PAYMENT_REQUIRED),
            (
                AuditError::LimitReached {
                    used: 3,
                    limit: 3,
                    remaining: 0,
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (AuditError::conflict("slug"), StatusCode::CONFLICT),
            (AuditError::InvalidInput("x".to_string()), StatusCode::BAD_REQUEST),
            (AuditError::Storage(StorageError::Busy), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(status_for(&error), status, "{error}");
        }
    }

    #[test]
    fn test_account_not_found_body_matches_not_found() {
        let body = body_for(&AuditError::AccountNotFound {
            account_id: "acct_secret".to_string(),
        });
        assert_eq!(body.code, "NOT_FOUND");
        assert!(!body.error.contains("acct_secret"));
    }

    #[test]
    fn test_limit_body_carries_counts() {
        let body = body_for(&AuditError::LimitReached {
            used: 3,
            limit: 3,
            remaining: 0,
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["remaining"], 0);
        assert_eq!(json["limit"], 3);
        assert_eq!(json["code"], "LIMIT_REACHED");
    }

    #[test]
    fn test_storage_details_are_not_leaked() {
        let body = body_for(&AuditError::Storage(StorageError::Sqlite {
            message: "no such table: audits".to_string(),
        }));
        assert_eq!(body.error, "Internal server error");
    }
}
