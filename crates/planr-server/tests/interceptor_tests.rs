//! Audit interceptor behaviour over the in-memory store
//!
//! These run without a database. Postgres-specific guarantees (independent
//! commit, rollback survival) live in `audit_pg_tests.rs`.

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use futures::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use planr_server::audit::{
    classify, ActorIdentity, AuditArg, AuditError, AuditMessages, AuditQuery, AuditRecord,
    AuditRoles, AuditStore, Intercepted, MemoryAuditStore, NewAuditRecord, SubjectRequest,
};
use planr_server::features::managers::SaveManagerRequest;
use planr_server::features::shared::AuthUser;

mod common;
use common::{interceptor_over, memory_interceptor, ADDED, ADD_FAILED};

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
struct Rejected(String);

/// Memory store whose appends take as long as a database round-trip
struct SlowStore {
    inner: MemoryAuditStore,
    delay: Duration,
}

impl SlowStore {
    fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryAuditStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl AuditStore for SlowStore {
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, AuditError> {
        tokio::time::sleep(self.delay).await;
        self.inner.append(record).await
    }

    async fn list(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, AuditError> {
        self.inner.list(query).await
    }
}

#[tokio::test]
async fn test_success_records_template_at_entry_time() {
    let (store, interceptor) = memory_interceptor();

    let before = Utc::now().trunc_subsecs(6);
    let value = interceptor
        .audit("save_manager", &[], || async { Ok::<_, Rejected>("saved") })
        .await
        .unwrap();
    let after = Utc::now();

    assert_eq!(value, "saved");

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, ADDED);
    assert!(before <= records[0].created_at && records[0].created_at <= after);
}

#[tokio::test]
async fn test_failure_records_composed_message_and_returns_error() {
    let (store, interceptor) = memory_interceptor();

    let result = interceptor
        .audit("save_manager", &[AuditArg::Target(5)], || async {
            Err::<(), _>(Rejected("Todo not found".to_string()))
        })
        .await;

    let err = result.unwrap_err().operation().unwrap();
    assert_eq!(err.to_string(), "Todo not found");

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, format!("{}: Todo not found", ADD_FAILED));
}

#[tokio::test]
async fn test_record_written_before_caller_sees_failure() {
    let (store, interceptor) = memory_interceptor();

    let result = interceptor
        .audit("save_manager", &[], || async { Err::<(), _>(Rejected("nope".into())) })
        .await;

    assert!(result.is_err());
    // The wrapper has returned, so the record must already be there
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn test_unregistered_operation_uses_default_messages() {
    let (store, interceptor) = memory_interceptor();

    interceptor
        .audit("delete_todo", &[], || async { Ok::<_, Rejected>(()) })
        .await
        .unwrap();
    let _ = interceptor
        .audit("delete_todo", &[], || async { Err::<(), _>(Rejected("gone".into())) })
        .await;

    let messages: Vec<_> = store.records().into_iter().map(|r| r.message).collect();
    assert_eq!(messages, vec!["success".to_string(), "failure: gone".to_string()]);
}

#[tokio::test]
async fn test_audit_outage_surfaces_on_both_paths() {
    let (store, interceptor) = memory_interceptor();
    store.set_unavailable(true);

    let ok_path = interceptor
        .audit("save_manager", &[], || async { Ok::<_, Rejected>(1) })
        .await;
    assert!(matches!(ok_path, Err(Intercepted::Audit(_))));

    let err_path = interceptor
        .audit("save_manager", &[], || async { Err::<i32, _>(Rejected("boom".into())) })
        .await;
    assert!(matches!(err_path, Err(Intercepted::Audit(_))));

    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_wrap_with_explicit_roles() {
    let (store, interceptor) = memory_interceptor();
    let messages = AuditMessages::new("Todo archived", "Todo archive failed");
    let roles = AuditRoles::default().with_actor(1).with_target(99);

    interceptor
        .wrap_with_roles(&messages, roles, || async { Ok::<_, Rejected>(()) })
        .await
        .unwrap();

    assert_eq!(store.records()[0].message, "Todo archived");
}

#[tokio::test]
async fn test_concurrent_calls_each_leave_one_record() {
    let (store, interceptor) = memory_interceptor();

    let mut handles = Vec::new();
    for i in 0..100_i64 {
        let interceptor = interceptor.clone();
        handles.push(tokio::spawn(async move {
            interceptor
                .audit("save_manager", &[AuditArg::Target(i)], || async move {
                    if i % 2 == 0 {
                        Ok(i)
                    } else {
                        Err(Rejected(format!("call {}", i)))
                    }
                })
                .await
        }));
    }

    let mut ok = 0;
    let mut failed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(Intercepted::Operation(_)) => failed += 1,
            Err(Intercepted::Audit(e)) => panic!("unexpected audit error: {}", e),
        }
    }
    assert_eq!((ok, failed), (50, 50));

    let records = store.records();
    assert_eq!(records.len(), 100);

    let ids: HashSet<_> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 100);

    let successes = records.iter().filter(|r| r.message == ADDED).count();
    let failure_messages: HashSet<_> = records
        .iter()
        .filter(|r| r.message.starts_with(ADD_FAILED))
        .map(|r| r.message.clone())
        .collect();
    assert_eq!(successes, 50);
    assert_eq!(failure_messages.len(), 50);
    assert!(failure_messages.contains(&format!("{}: call 99", ADD_FAILED)));
}

#[test]
fn test_classifier_resolves_save_manager_arguments() {
    let caller = AuthUser {
        id: 7,
        email: "owner@example.com".to_string(),
    };
    let request = SaveManagerRequest { manager_user_id: 3 };

    let roles = classify(&[
        AuditArg::Actor(&caller),
        AuditArg::Subject(&request),
        AuditArg::Target(5),
    ]);

    assert_eq!(roles, AuditRoles::default().with_actor(7).with_subject(3).with_target(5));
    assert_eq!(caller.actor_id(), 7);
    assert_eq!(request.subject_id(), 3);
}

#[test]
fn test_classifier_without_matches_reports_unknown() {
    let roles = classify(&[AuditArg::Other]);

    assert_eq!(
        format!("{} {} {}", roles.actor(), roles.subject(), roles.target()),
        "Unknown Unknown Unknown"
    );
}

#[tokio::test]
async fn test_interceptor_is_shareable_across_tasks() {
    let (store, interceptor) = memory_interceptor();
    let interceptor = Arc::new(interceptor);

    let a = {
        let interceptor = interceptor.clone();
        tokio::spawn(async move {
            interceptor.audit("save_manager", &[], || async { Ok::<_, Rejected>(()) }).await
        })
    };
    a.await.unwrap().unwrap();

    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn test_detached_call_still_records_when_caller_gives_up() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(50)));
    let interceptor = interceptor_over(store.clone());
    let commits = Arc::new(AtomicUsize::new(0));

    let committed = commits.clone();
    let call = interceptor.audit_detached(
        "save_manager",
        AuditRoles::default().with_target(5),
        move || async move {
            committed.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Rejected>(())
        },
    );

    // The caller stops waiting while the audit write is still in flight
    let gave_up = tokio::time::timeout(Duration::from_millis(10), call).await;
    assert!(gave_up.is_err());

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(commits.load(Ordering::SeqCst), 1);
    let records = store.inner.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, ADDED);
}

#[tokio::test]
async fn test_detached_call_returns_operation_error() {
    let (store, interceptor) = memory_interceptor();

    let result = interceptor
        .audit_detached("save_manager", AuditRoles::default(), || async {
            Err::<(), _>(Rejected("Todo not found".into()))
        })
        .await;

    assert_eq!(result.unwrap_err().operation(), Some(Rejected("Todo not found".into())));
    assert_eq!(store.records()[0].message, format!("{}: Todo not found", ADD_FAILED));
}

async fn explode() -> Result<(), Rejected> {
    panic!("boom")
}

#[tokio::test]
async fn test_detached_panic_is_recorded_and_resumed() {
    let (store, interceptor) = memory_interceptor();

    let outcome = AssertUnwindSafe(interceptor.audit_detached(
        "save_manager",
        AuditRoles::default(),
        explode,
    ))
    .catch_unwind()
    .await;

    assert!(outcome.is_err());
    assert_eq!(store.records()[0].message, format!("{}: panicked: boom", ADD_FAILED));
}
