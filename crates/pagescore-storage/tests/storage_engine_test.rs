//! AuditStorageEngine tests: metered creation, share link state machine,
//! subscription ordering, and file-backed persistence.

use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Duration, TimeZone, Utc};

use pagescore_core::errors::{AuditError, StorageError};
use pagescore_core::traits::storage::CreateAuditOutcome;
use pagescore_core::traits::IAuditStorage;
use pagescore_core::types::{
    Account, Audit, Plan, PlanFlagOverrides, PlanLimits, PublishOutcome, RawInputs,
    ScoreBreakdown, Subscription, SubscriptionStatus, UsagePeriod,
};
use pagescore_storage::AuditStorageEngine;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
}

fn engine_with_account(account_id: &str) -> AuditStorageEngine {
    let engine = AuditStorageEngine::open_in_memory().unwrap();
    engine
        .insert_account(&Account {
            id: account_id.to_string(),
            created_at: t0(),
        })
        .unwrap();
    engine
}

fn audit(account_id: &str, created_at: DateTime<Utc>) -> Audit {
    Audit {
        id: uuid::Uuid::new_v4().to_string(),
        account_id: account_id.to_string(),
        inputs: RawInputs {
            followers: Some(1000),
            likes: Some(40),
            ..Default::default()
        },
        score: 55,
        breakdown: ScoreBreakdown {
            engagement: 60,
            consistency: 50,
            readiness: 45,
        },
        metrics: Default::default(),
        posts: Default::default(),
        recommendations: Vec::new(),
        ai_insights: Some(serde_json::json!({"summary": "steady"})),
        demographics: None,
        unlocked: false,
        created_at,
    }
}

#[test]
fn test_create_audit_stops_at_limit_and_writes_nothing() {
    let engine = engine_with_account("acct");
    let period = UsagePeriod::containing(t0());

    for expected in 1..=3 {
        match engine.create_audit(&audit("acct", t0()), None, &period, 3).unwrap() {
            CreateAuditOutcome::Created { used, .. } => assert_eq!(used, expected),
            other => panic!("unexpected {other:?}"),
        }
    }

    let rejected = audit("acct", t0());
    let outcome = engine.create_audit(&rejected, None, &period, 3).unwrap();
    assert_eq!(outcome, CreateAuditOutcome::LimitReached { used: 3 });
    assert!(engine.get_audit(&rejected.id).unwrap().is_none());
    assert_eq!(engine.get_usage_count("acct", &period).unwrap(), 3);
}

#[test]
fn test_request_key_replay_returns_first_audit_without_counting() {
    let engine = engine_with_account("acct");
    let period = UsagePeriod::containing(t0());
    let first = audit("acct", t0());

    engine.create_audit(&first, Some("req-1"), &period, 3).unwrap();
    let outcome = engine
        .create_audit(&audit("acct", t0()), Some("req-1"), &period, 3)
        .unwrap();

    match outcome {
        CreateAuditOutcome::Replayed { audit } => assert_eq!(audit.id, first.id),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(engine.get_usage_count("acct", &period).unwrap(), 1);
}

#[test]
fn test_audit_round_trips_json_columns() {
    let engine = engine_with_account("acct");
    let period = UsagePeriod::containing(t0());
    let stored = audit("acct", t0());
    engine.create_audit(&stored, None, &period, 3).unwrap();

    let loaded = engine.get_audit(&stored.id).unwrap().unwrap();
    assert_eq!(loaded, stored);
}

#[test]
fn test_concurrent_creates_never_exceed_limit() {
    let engine = Arc::new(engine_with_account("acct"));
    let period = UsagePeriod::containing(t0());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let period = period.clone();
            thread::spawn(move || {
                matches!(
                    engine.create_audit(&audit("acct", t0()), None, &period, 3).unwrap(),
                    CreateAuditOutcome::Created { .. }
                )
            })
        })
        .collect();

    let created = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|created| *created)
        .count();
    assert_eq!(created, 3);
    assert_eq!(engine.get_usage_count("acct", &period).unwrap(), 3);
}

#[test]
fn test_list_audits_newest_first_within_window() {
    let engine = engine_with_account("acct");
    let period = UsagePeriod::containing(t0());
    let old = audit("acct", t0() - Duration::days(40));
    let mid = audit("acct", t0() - Duration::days(5));
    let new = audit("acct", t0());
    for a in [&old, &mid, &new] {
        engine.create_audit(a, None, &period, 10).unwrap();
    }

    let listed = engine
        .list_audits("acct", t0() - Duration::days(30), 50)
        .unwrap();
    let ids: Vec<_> = listed.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec![new.id.as_str(), mid.id.as_str()]);
}

#[test]
fn test_unlock_is_sticky_and_reports_missing() {
    let engine = engine_with_account("acct");
    let a = audit("acct", t0());
    engine
        .create_audit(&a, None, &UsagePeriod::containing(t0()), 3)
        .unwrap();

    assert!(engine.set_audit_unlocked(&a.id).unwrap());
    assert!(engine.set_audit_unlocked(&a.id).unwrap());
    assert!(engine.get_audit(&a.id).unwrap().unwrap().unlocked);
    assert!(!engine.set_audit_unlocked("missing").unwrap());
}

#[test]
fn test_publish_revoke_and_republish_share() {
    let engine = engine_with_account("acct");
    let a = audit("acct", t0());
    engine
        .create_audit(&a, None, &UsagePeriod::containing(t0()), 3)
        .unwrap();

    assert_eq!(
        engine.publish_share(&a.id, "slug-one", t0()).unwrap(),
        PublishOutcome::Published {
            slug: "slug-one".to_string()
        }
    );
    assert_eq!(
        engine.publish_share(&a.id, "slug-two", t0()).unwrap(),
        PublishOutcome::AlreadyPublic {
            slug: "slug-one".to_string()
        }
    );

    let view = engine.record_public_view("slug-one").unwrap().unwrap();
    assert_eq!(view.audit_id, a.id);
    assert_eq!(view.view_count, 1);

    assert!(engine.revoke_share(&a.id, t0()).unwrap());
    assert!(!engine.revoke_share(&a.id, t0()).unwrap());
    assert!(engine.record_public_view("slug-one").unwrap().is_none());

    let record = engine.get_share(&a.id).unwrap().unwrap();
    assert!(!record.is_public);
    assert!(record.slug.is_none());
    assert_eq!(record.view_count, 1);

    assert_eq!(
        engine.publish_share(&a.id, "slug-three", t0()).unwrap(),
        PublishOutcome::Published {
            slug: "slug-three".to_string()
        }
    );
    assert_eq!(engine.get_share(&a.id).unwrap().unwrap().view_count, 1);
}

#[test]
fn test_publish_reports_slug_collision() {
    let engine = engine_with_account("acct");
    let period = UsagePeriod::containing(t0());
    let first = audit("acct", t0());
    let second = audit("acct", t0());
    engine.create_audit(&first, None, &period, 3).unwrap();
    engine.create_audit(&second, None, &period, 3).unwrap();

    engine.publish_share(&first.id, "shared", t0()).unwrap();
    assert_eq!(
        engine.publish_share(&second.id, "shared", t0()).unwrap(),
        PublishOutcome::SlugTaken
    );
    assert!(engine.get_share(&second.id).unwrap().is_none());
}

#[test]
fn test_stale_subscription_update_is_ignored() {
    let engine = engine_with_account("acct");
    let newer = Subscription {
        account_id: "acct".to_string(),
        plan: "pro".to_string(),
        status: SubscriptionStatus::Active,
        updated_at: t0(),
    };
    let older = Subscription {
        status: SubscriptionStatus::Canceled,
        updated_at: t0() - Duration::hours(1),
        ..newer.clone()
    };

    engine.upsert_subscription(&newer).unwrap();
    engine.upsert_subscription(&older).unwrap();
    assert_eq!(engine.get_subscription("acct").unwrap().unwrap(), newer);
}

#[test]
fn test_subscription_for_unknown_account_violates_foreign_key() {
    let engine = AuditStorageEngine::open_in_memory().unwrap();
    let err = engine
        .upsert_subscription(&Subscription {
            account_id: "ghost".to_string(),
            plan: "pro".to_string(),
            status: SubscriptionStatus::Active,
            updated_at: t0(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        AuditError::Storage(StorageError::ConstraintViolation { .. })
    ));
}

#[test]
fn test_free_grant_is_granted_once_per_period() {
    let engine = engine_with_account("acct");
    let march = UsagePeriod::containing(t0());
    let april = UsagePeriod::containing(t0() + Duration::days(31));

    assert!(engine.insert_free_grant("acct", &march, t0()).unwrap());
    assert!(!engine.insert_free_grant("acct", &march, t0()).unwrap());
    assert!(engine.has_free_grant("acct", &march).unwrap());
    assert!(!engine.has_free_grant("acct", &april).unwrap());
}

#[test]
fn test_plan_overrides_round_trip() {
    let engine = AuditStorageEngine::open_in_memory().unwrap();
    let plan = Plan {
        name: "pro".to_string(),
        limits: PlanLimits {
            audits_per_month: 999_999,
            pdf_exports: 50,
            history_days: 365,
        },
        overrides: PlanFlagOverrides {
            can_share_report: Some(true),
            can_view_ai_insights: Some(false),
            ..Default::default()
        },
    };
    engine.upsert_plan(&plan).unwrap();
    assert_eq!(engine.get_plan("pro").unwrap().unwrap(), plan);
    assert!(engine.get_plan("enterprise").unwrap().is_none());
}

#[test]
fn test_file_backed_engine_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagescore.db");
    let a = audit("acct", t0());

    {
        let engine = AuditStorageEngine::open(&path, 2).unwrap();
        engine
            .insert_account(&Account {
                id: "acct".to_string(),
                created_at: t0(),
            })
            .unwrap();
        engine
            .create_audit(&a, None, &UsagePeriod::containing(t0()), 3)
            .unwrap();
        let health = engine.health_check().unwrap();
        assert!(health.connected);
        assert!(health.wal_mode);
        assert_eq!(health.schema_version, 1);
    }

    let reopened = AuditStorageEngine::open(&path, 2).unwrap();
    assert_eq!(reopened.get_audit(&a.id).unwrap().unwrap().id, a.id);
    assert_eq!(
        reopened
            .get_usage_count("acct", &UsagePeriod::containing(t0()))
            .unwrap(),
        1
    );
}
