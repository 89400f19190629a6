//! Full HTTP round trips against both listeners bound to ephemeral ports.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use pagescore_core::PageScoreConfig;
use pagescore_engine::AuditService;
use pagescore_server::{internal_router, router, AppState};
use pagescore_storage::AuditStorageEngine;

struct Listeners {
    public: SocketAddr,
    internal: SocketAddr,
}

async fn serve(app: axum::Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_server() -> Listeners {
    let storage = AuditStorageEngine::open_in_memory().unwrap();
    let service = AuditService::new(Arc::new(storage), &PageScoreConfig::default());
    let state = AppState::new(service);
    Listeners {
        public: serve(router(state.clone())).await,
        internal: serve(internal_router(state)).await,
    }
}

async fn register(listeners: &Listeners, account: &str) {
    let (status, _) = send(
        listeners.internal,
        "POST",
        "/internal/accounts",
        None,
        Some(json!({"account_id": account})),
    )
    .await;
    assert_eq!(status, 200);
}

async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    account: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let body_text = body.map(|b| b.to_string()).unwrap_or_default();
    let mut request = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n",
        body_text.len()
    );
    if !body_text.is_empty() {
        request.push_str("Content-Type: application/json\r\n");
    }
    if let Some(account) = account {
        request.push_str(&format!("x-account-id: {account}\r\n"));
    }
    request.push_str("\r\n");
    request.push_str(&body_text);

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();

    let status = text
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap();
    let payload = text.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("");
    let json = if payload.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(payload).unwrap()
    };
    (status, json)
}

fn audit_body() -> Value {
    json!({
        "inputs": {
            "followers": 1500,
            "likes": 90,
            "comments": 12,
            "shares": 4,
            "postsAnalyzed": 10,
            "periodDays": 30,
            "checklist": {
                "hasProfilePhoto": true,
                "hasCoverPhoto": true,
                "hasDescription": false,
                "hasContactInfo": true,
                "hasCallToAction": false
            }
        }
    })
}

#[tokio::test]
async fn test_share_lifecycle_over_http() {
    let listeners = spawn_server().await;
    let addr = listeners.public;
    register(&listeners, "acct").await;

    let (status, run) = send(addr, "POST", "/v1/audits", Some("acct"), Some(audit_body())).await;
    assert_eq!(status, 201);
    let audit_id = run["report"]["audit_id"].as_str().unwrap().to_string();
    assert_eq!(run["report"]["access"], "gated");
    assert_eq!(run["usage"]["remaining"], 2);

    let share_path = format!("/v1/audits/{audit_id}/share");
    let (status, body) = send(addr, "POST", &share_path, Some("acct"), None).await;
    assert_eq!(status, 402);
    assert_eq!(body["code"], "PRO_REQUIRED");

    let (status, _) = send(
        listeners.internal,
        "PUT",
        "/internal/subscriptions/acct",
        None,
        Some(json!({"plan": "pro", "status": "active"})),
    )
    .await;
    assert_eq!(status, 204);

    let (status, link) = send(addr, "POST", &share_path, Some("acct"), None).await;
    assert_eq!(status, 201);
    let slug = link["slug"].as_str().unwrap().to_string();
    let (status, again) = send(addr, "POST", &share_path, Some("acct"), None).await;
    assert_eq!(status, 200);
    assert_eq!(again["shareUrl"], link["shareUrl"]);

    let public_path = format!("/public/reports/{slug}");
    let (status, public) = send(addr, "GET", &public_path, None, None).await;
    assert_eq!(status, 200);
    assert_eq!(public["access"], "full");
    assert_eq!(public["locked_sections"], json!([]));

    let (status, revoked) = send(addr, "DELETE", &share_path, Some("acct"), None).await;
    assert_eq!(status, 200);
    assert_eq!(revoked["revoked"], true);

    let (status, body) = send(addr, "GET", &public_path, None, None).await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, report) = send(addr, "GET", &format!("/v1/audits/{audit_id}"), Some("acct"), None).await;
    assert_eq!(status, 200);
    assert_eq!(report["access"], "full");
}

#[tokio::test]
async fn test_limit_and_identity_errors_over_http() {
    let listeners = spawn_server().await;
    let addr = listeners.public;
    register(&listeners, "free").await;

    let (status, body) = send(addr, "GET", "/v1/entitlements", None, None).await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let (status, body) = send(addr, "GET", "/v1/entitlements", Some("nobody"), None).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Not found");

    for _ in 0..3 {
        let (status, _) = send(addr, "POST", "/v1/audits", Some("free"), Some(audit_body())).await;
        assert_eq!(status, 201);
    }
    let (status, body) = send(addr, "POST", "/v1/audits", Some("free"), Some(audit_body())).await;
    assert_eq!(status, 429);
    assert_eq!(body["code"], "LIMIT_REACHED");
    assert_eq!(body["remaining"], 0);
    assert_eq!(body["limit"], 3);

    let (status, snapshot) = send(addr, "GET", "/v1/entitlements", Some("free"), None).await;
    assert_eq!(status, 200);
    assert_eq!(snapshot["isPro"], false);
    assert_eq!(snapshot["usage"]["remaining"], 0);
    assert_eq!(snapshot["features"]["canViewAIInsights"], false);

    let (status, history) = send(addr, "GET", "/v1/audits", Some("free"), None).await;
    assert_eq!(status, 200);
    assert_eq!(history.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_healthz_reports_schema_version() {
    let listeners = spawn_server().await;
    for addr in [listeners.public, listeners.internal] {
        let (status, body) = send(addr, "GET", "/healthz", None, None).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["schema_version"], 1);
    }
}

#[tokio::test]
async fn test_public_listener_does_not_serve_internal_routes() {
    let listeners = spawn_server().await;
    register(&listeners, "acct").await;

    let attempts = [
        ("POST", "/internal/accounts", json!({"account_id": "mallory"})),
        ("PUT", "/internal/subscriptions/acct", json!({"plan": "pro", "status": "active"})),
        ("POST", "/internal/grants/acct", json!({})),
        ("POST", "/internal/audits/any/unlock", json!({})),
        ("POST", "/internal/accounts/acct/audits", audit_body()),
    ];
    for (method, path, body) in attempts {
        let (status, _) = send(listeners.public, method, path, Some("acct"), Some(body)).await;
        assert_eq!(status, 404, "{method} {path} reachable on the public listener");
    }

    let (_, snapshot) = send(listeners.public, "GET", "/v1/entitlements", Some("acct"), None).await;
    assert_eq!(snapshot["isPro"], false);
    assert_eq!(snapshot["plan"], "free");
}

#[tokio::test]
async fn test_free_caller_cannot_reach_full_report_through_v1_routes() {
    let listeners = spawn_server().await;
    let addr = listeners.public;
    register(&listeners, "free").await;

    let mut forged = audit_body();
    forged["ai_insights"] = json!({"summary": "forged"});
    forged["demographics"] = json!({"top_city": "forged"});
    let (status, run) = send(addr, "POST", "/v1/audits", Some("free"), Some(forged)).await;
    assert_eq!(status, 201);
    let audit_id = run["report"]["audit_id"].as_str().unwrap().to_string();
    let report_path = format!("/v1/audits/{audit_id}");

    // Former self-service override routes no longer exist.
    let (status, _) = send(addr, "POST", "/v1/grants", Some("free"), None).await;
    assert_eq!(status, 404);
    let (status, _) = send(addr, "POST", &format!("{report_path}/unlock"), Some("free"), None).await;
    assert_eq!(status, 404);

    let (status, report) = send(addr, "GET", &report_path, Some("free"), None).await;
    assert_eq!(status, 200);
    assert_eq!(report["access"], "gated");
    assert_eq!(report["locked_sections"].as_array().unwrap().len(), 7);

    let (_, snapshot) = send(addr, "GET", "/v1/entitlements", Some("free"), None).await;
    assert_eq!(snapshot["isPro"], false);
    assert_eq!(snapshot["usage"]["limit"], 3);

    let (status, _) = send(addr, "POST", &format!("{report_path}/share"), Some("free"), None).await;
    assert_eq!(status, 402);

    // An operator grant opens the report, and the body's forged sections were never stored.
    let (status, grant) = send(listeners.internal, "POST", "/internal/grants/free", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(grant["granted"], true);
    let (_, report) = send(addr, "GET", &report_path, Some("free"), None).await;
    assert_eq!(report["access"], "full");
    assert!(report["ai_insights"].is_null());
    assert!(report["demographics"].is_null());
}

#[tokio::test]
async fn test_operator_unlock_and_enrichment_use_the_internal_listener() {
    let listeners = spawn_server().await;
    register(&listeners, "acct").await;

    let mut body = audit_body();
    body["ai_insights"] = json!({"summary": "post more video"});
    let (status, run) = send(
        listeners.internal,
        "POST",
        "/internal/accounts/acct/audits",
        None,
        Some(body),
    )
    .await;
    assert_eq!(status, 201);
    let audit_id = run["report"]["audit_id"].as_str().unwrap().to_string();
    let report_path = format!("/v1/audits/{audit_id}");

    let (_, gated) = send(listeners.public, "GET", &report_path, Some("acct"), None).await;
    assert_eq!(gated["access"], "gated");
    assert!(gated.get("ai_insights").is_none());

    let (status, summary) = send(
        listeners.internal,
        "POST",
        &format!("/internal/audits/{audit_id}/unlock"),
        None,
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(summary["unlocked"], true);

    let (_, full) = send(listeners.public, "GET", &report_path, Some("acct"), None).await;
    assert_eq!(full["access"], "full");
    assert_eq!(full["ai_insights"], json!({"summary": "post more video"}));

    let (status, body) = send(
        listeners.internal,
        "POST",
        "/internal/audits/missing/unlock",
        None,
        None,
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");
}
