//! Route handlers. Service calls are synchronous SQLite work, so each runs
//! on the blocking pool.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pagescore_core::errors::AuditResult;
use pagescore_core::types::{
    Account, AuditComparison, AuditEnrichment, AuditRequest, AuditSummary, Caller,
    EntitlementSnapshot, ReportPayload, ShareLink, SubscriptionStatus,
};
use pagescore_engine::{AuditService, RunAuditOutcome};

use crate::error::{ApiError, ApiResult};
use crate::identity::caller_from_headers;
use crate::AppState;

async fn blocking<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&AuditService) -> AuditResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub wal_mode: bool,
    pub schema_version: u32,
}

pub async fn healthz(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<HealthResponse>)> {
    let health = blocking(&state, |s| s.health()).await?;
    let status = if health.connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((
        status,
        Json(HealthResponse {
            status: if health.connected { "ok" } else { "degraded" }.to_string(),
            wal_mode: health.wal_mode,
            schema_version: health.schema_version,
        }),
    ))
}

pub async fn get_entitlements(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<EntitlementSnapshot>> {
    let caller = caller_from_headers(&headers)?;
    Ok(Json(blocking(&state, move |s| s.entitlements(&caller)).await?))
}

/// 201 for a new audit, 200 when a request key was replayed.
pub async fn run_audit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AuditRequest>,
) -> ApiResult<(StatusCode, Json<RunAuditOutcome>)> {
    let caller = caller_from_headers(&headers)?;
    let outcome = blocking(&state, move |s| s.run_audit(&caller, request)).await?;
    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome)))
}

pub async fn list_audits(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<AuditSummary>>> {
    let caller = caller_from_headers(&headers)?;
    Ok(Json(blocking(&state, move |s| s.list_audits(&caller)).await?))
}

pub async fn get_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<ReportPayload>> {
    let caller = caller_from_headers(&headers)?;
    Ok(Json(blocking(&state, move |s| s.get_report(&caller, &id)).await?))
}

pub async fn create_share(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<ShareLink>)> {
    let caller = caller_from_headers(&headers)?;
    let link = blocking(&state, move |s| s.create_share(&caller, &id)).await?;
    let status = if link.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(link)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevokeResponse {
    pub revoked: bool,
}

pub async fn revoke_share(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<RevokeResponse>> {
    let caller = caller_from_headers(&headers)?;
    let revoked = blocking(&state, move |s| s.revoke_share(&caller, &id)).await?;
    Ok(Json(RevokeResponse { revoked }))
}

pub async fn compare_audits(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((a, b)): Path<(String, String)>,
) -> ApiResult<Json<AuditComparison>> {
    let caller = caller_from_headers(&headers)?;
    Ok(Json(
        blocking(&state, move |s| s.compare_audits(&caller, &a, &b)).await?,
    ))
}

/// Unauthenticated.
pub async fn public_report(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ReportPayload>> {
    Ok(Json(blocking(&state, move |s| s.public_report(&slug)).await?))
}

// ── Internal listener ──

#[derive(Debug, Deserialize)]
pub struct RegisterAccountRequest {
    pub account_id: String,
}

pub async fn register_account(
    State(state): State<AppState>,
    Json(request): Json<RegisterAccountRequest>,
) -> ApiResult<Json<Account>> {
    Ok(Json(
        blocking(&state, move |s| s.register_account(&request.account_id)).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionEvent {
    pub plan: String,
    pub status: SubscriptionStatus,
    /// Provider event time; defaults to receipt time.
    pub event_at: Option<DateTime<Utc>>,
}

pub async fn apply_subscription(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(event): Json<SubscriptionEvent>,
) -> ApiResult<StatusCode> {
    let event_at = event.event_at.unwrap_or_else(Utc::now);
    blocking(&state, move |s| {
        s.apply_subscription(&account_id, &event.plan, event.status, event_at)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GrantResponse {
    pub granted: bool,
}

pub async fn grant_free_month(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> ApiResult<Json<GrantResponse>> {
    let granted = blocking(&state, move |s| s.grant_free_month(&account_id)).await?;
    Ok(Json(GrantResponse { granted }))
}

/// Promo redemption.
pub async fn unlock_audit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AuditSummary>> {
    Ok(Json(blocking(&state, move |s| s.unlock_audit(&id)).await?))
}

/// An audit request forwarded by the insights collaborator on behalf of `account_id`.
#[derive(Debug, Deserialize)]
pub struct EnrichedAuditRequest {
    #[serde(flatten)]
    pub request: AuditRequest,
    #[serde(flatten)]
    pub enrichment: AuditEnrichment,
}

pub async fn run_enriched_audit(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(body): Json<EnrichedAuditRequest>,
) -> ApiResult<(StatusCode, Json<RunAuditOutcome>)> {
    let caller = Caller::new(account_id);
    let outcome = blocking(&state, move |s| {
        s.run_enriched_audit(&caller, body.request, body.enrichment)
    })
    .await?;
    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome)))
}
