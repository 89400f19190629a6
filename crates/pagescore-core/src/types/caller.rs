//! Caller identity, supplied by the authentication collaborator.

use chrono::{DateTime, Utc};

/// An already-authenticated account identifier plus the credential's expiry, if known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub account_id: String,
    pub session_expires_at: Option<DateTime<Utc>>,
}

impl Caller {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            session_expires_at: None,
        }
    }

    pub fn with_session_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.session_expires_at = Some(expires_at);
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.session_expires_at.is_some_and(|at| at <= now)
    }
}
