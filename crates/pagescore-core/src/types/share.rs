//! Public share link records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// At most one per audit. `slug` is cleared on revoke; `view_count` never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub audit_id: String,
    pub slug: Option<String>,
    pub is_public: bool,
    pub view_count: u64,
    pub updated_at: DateTime<Utc>,
}

impl ShareRecord {
    /// The slug, if the record is currently public.
    pub fn active_slug(&self) -> Option<&str> {
        if self.is_public {
            self.slug.as_deref()
        } else {
            None
        }
    }
}

/// Result of a conflict-checked publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The given slug now addresses the audit.
    Published { slug: String },
    /// Someone already published this audit; their slug wins.
    AlreadyPublic { slug: String },
    /// The slug belongs to another audit.
    SlugTaken,
}

/// A counted public fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicView {
    pub audit_id: String,
    pub view_count: u64,
}

/// Returned by share creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub share_url: String,
    pub slug: String,
    /// False when an existing public link was returned.
    pub created: bool,
}
