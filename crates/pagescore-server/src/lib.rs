//! # pagescore-server
//!
//! axum adapter over `AuditService`. Caller identity arrives from the
//! upstream auth collaborator as `x-account-id` / `x-session-expires-at`
//! headers; this crate never authenticates on its own.
//!
//! Two routers: `router` for end callers and `internal_router` for the
//! collaborators, each bound to its own listener.

pub mod error;
pub mod handlers;
pub mod identity;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use pagescore_engine::AuditService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AuditService>,
}

impl AppState {
    pub fn new(service: AuditService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Caller-facing routes. Nothing here can change billing state, grants,
/// or unlock flags.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/v1/entitlements", get(handlers::get_entitlements))
        .route(
            "/v1/audits",
            get(handlers::list_audits).post(handlers::run_audit),
        )
        .route("/v1/audits/:id", get(handlers::get_report))
        .route(
            "/v1/audits/:id/share",
            post(handlers::create_share).delete(handlers::revoke_share),
        )
        .route("/v1/compare/:a/:b", get(handlers::compare_audits))
        .route("/public/reports/:slug", get(handlers::public_report))
        .with_state(state)
}

/// Collaborator routes (identity, payment webhook, promo redemption, insights).
/// Served on `[server] internal_bind`, never on the public listener.
pub fn internal_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/internal/accounts", post(handlers::register_account))
        .route(
            "/internal/accounts/:account_id/audits",
            post(handlers::run_enriched_audit),
        )
        .route(
            "/internal/subscriptions/:account_id",
            put(handlers::apply_subscription),
        )
        .route(
            "/internal/grants/:account_id",
            post(handlers::grant_free_month),
        )
        .route("/internal/audits/:id/unlock", post(handlers::unlock_audit))
        .with_state(state)
}
