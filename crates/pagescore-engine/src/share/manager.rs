//! Share link lifecycle: create (Pro-gated, idempotent), revoke, public fetch.
//!
//! Two concurrent creates for one audit are settled by the conditional
//! publish in storage; the loser gets the winner's slug back. Slug
//! collisions with other audits are retried with a fresh slug a bounded
//! number of times, then reported as a conflict.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use pagescore_core::config::ShareConfig;
use pagescore_core::errors::{AuditError, AuditResult};
use pagescore_core::traits::IAuditStorage;
use pagescore_core::types::{
    Audit, Capability, EntitlementSnapshot, PublishOutcome, ReportPayload, ShareLink, ShareRecord,
    ShareState,
};

use super::slug::{RandomSlugGenerator, SlugGenerator};
use crate::access::ReportAccessGate;

pub struct ShareLinkManager {
    config: ShareConfig,
    slugs: Arc<dyn SlugGenerator>,
    gate: ReportAccessGate,
}

impl ShareLinkManager {
    pub fn new(config: ShareConfig) -> Self {
        let slugs = Arc::new(RandomSlugGenerator::new(config.effective_slug_length()));
        Self::with_generator(config, slugs)
    }

    pub fn with_generator(config: ShareConfig, slugs: Arc<dyn SlugGenerator>) -> Self {
        Self {
            config,
            slugs,
            gate: ReportAccessGate::new(),
        }
    }

    pub fn share_url(&self, slug: &str) -> String {
        self.config.share_url(slug)
    }

    /// Owner-facing state of a record.
    pub fn state_of(&self, record: Option<&ShareRecord>) -> ShareState {
        match record {
            Some(r) => ShareState {
                is_public: r.is_public,
                share_url: r.active_slug().map(|slug| self.share_url(slug)),
                view_count: r.view_count,
            },
            None => ShareState {
                is_public: false,
                share_url: None,
                view_count: 0,
            },
        }
    }

    /// Publish `audit` (already ownership-checked). Fails with `ProRequired`
    /// before touching storage when the caller lacks full access to it.
    pub fn create(
        &self,
        storage: &dyn IAuditStorage,
        audit: &Audit,
        entitlement: &EntitlementSnapshot,
        now: DateTime<Utc>,
    ) -> AuditResult<ShareLink> {
        if !self.gate.effective_access(audit, entitlement) {
            debug!(audit_id = %audit.id, "share refused: no full access");
            return Err(AuditError::pro_required(Capability::ShareReport.as_str()));
        }

        if let Some(slug) = storage
            .get_share(&audit.id)?
            .as_ref()
            .and_then(ShareRecord::active_slug)
        {
            return Ok(self.link(slug, false));
        }

        let attempts = self.config.effective_max_slug_attempts();
        for attempt in 1..=attempts {
            let candidate = self.slugs.generate();
            match storage.publish_share(&audit.id, &candidate, now)? {
                PublishOutcome::Published { slug } => {
                    info!(audit_id = %audit.id, attempt, "share link published");
                    return Ok(self.link(&slug, true));
                }
                PublishOutcome::AlreadyPublic { slug } => {
                    debug!(audit_id = %audit.id, "lost publish race, returning existing link");
                    return Ok(self.link(&slug, false));
                }
                PublishOutcome::SlugTaken => {
                    debug!(audit_id = %audit.id, attempt, "slug collision");
                }
            }
        }

        warn!(audit_id = %audit.id, attempts, "no free slug found");
        Err(AuditError::conflict(format!(
            "no unique share slug after {attempts} attempts"
        )))
    }

    /// Take the link down. Idempotent; true only when a public link was removed.
    pub fn revoke(
        &self,
        storage: &dyn IAuditStorage,
        audit: &Audit,
        now: DateTime<Utc>,
    ) -> AuditResult<bool> {
        let revoked = storage.revoke_share(&audit.id, now)?;
        if revoked {
            info!(audit_id = %audit.id, "share link revoked");
        }
        Ok(revoked)
    }

    /// Unauthenticated fetch. Counts exactly one view per successful call and
    /// serves the unrestricted payload.
    pub fn public_report(&self, storage: &dyn IAuditStorage, slug: &str) -> AuditResult<ReportPayload> {
        let not_found = || AuditError::not_found("shared report");

        let view = storage.record_public_view(slug)?.ok_or_else(not_found)?;
        let audit = storage.get_audit(&view.audit_id)?.ok_or_else(not_found)?;
        debug!(audit_id = %audit.id, views = view.view_count, "public report served");

        let share = ShareState {
            is_public: true,
            share_url: Some(self.share_url(slug)),
            view_count: view.view_count,
        };
        Ok(self.gate.full_payload(&audit, Some(share)))
    }

    fn link(&self, slug: &str, created: bool) -> ShareLink {
        ShareLink {
            share_url: self.share_url(slug),
            slug: slug.to_string(),
            created,
        }
    }
}
