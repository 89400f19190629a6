//! Caller identity headers set by the upstream auth collaborator.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};

use pagescore_core::errors::AuditError;
use pagescore_core::types::Caller;

use crate::error::{ApiError, ApiResult};

pub const ACCOUNT_ID_HEADER: &str = "x-account-id";
pub const SESSION_EXPIRES_HEADER: &str = "x-session-expires-at";

pub fn caller_from_headers(headers: &HeaderMap) -> ApiResult<Caller> {
    let account_id = headers
        .get(ACCOUNT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingIdentity)?;

    let mut caller = Caller::new(account_id);
    if let Some(raw) = headers.get(SESSION_EXPIRES_HEADER) {
        let expires_at = raw
            .to_str()
            .ok()
            .and_then(|v| DateTime::parse_from_rfc3339(v.trim()).ok())
            .ok_or_else(|| {
                AuditError::InvalidInput(format!("{SESSION_EXPIRES_HEADER} must be RFC 3339"))
            })?;
        caller = caller.with_session_expiry(expires_at.with_timezone(&Utc));
    }
    Ok(caller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_missing_account_header_is_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            caller_from_headers(&headers),
            Err(ApiError::MissingIdentity)
        ));
    }

    #[test]
    fn test_expiry_header_is_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCOUNT_ID_HEADER, HeaderValue::from_static("acct_1"));
        headers.insert(
            SESSION_EXPIRES_HEADER,
            HeaderValue::from_static("2026-10-17T10:00:00Z"),
        );
        let caller = caller_from_headers(&headers).unwrap();
        assert_eq!(caller.account_id, "acct_1");
        assert_eq!(
            caller.session_expires_at.unwrap().to_rfc3339(),
            "2026-10-17T10:00:00+00:00"
        );
    }

    #[test]
    fn test_malformed_expiry_is_invalid_input() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCOUNT_ID_HEADER, HeaderValue::from_static("acct_1"));
        headers.insert(SESSION_EXPIRES_HEADER, HeaderValue::from_static("tomorrow"));
        assert!(matches!(
            caller_from_headers(&headers),
            Err(ApiError::Audit(AuditError::InvalidInput(_)))
        ));
    }
}
