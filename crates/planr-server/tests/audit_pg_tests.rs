//! Audit and manager tests against PostgreSQL
//!
//! Run with a database available:
//! `DATABASE_URL=postgres://... cargo test --test audit_pg_tests -- --ignored`

use chrono::{Duration, SubsecRound, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use planr_server::audit::{
    AuditArg, AuditQuery, AuditStore, Intercepted, NewAuditRecord, PgAuditStore,
};
use planr_server::db;
use planr_server::features::managers::commands::{delete, save};
use planr_server::features::managers::queries::list;
use planr_server::features::managers::{
    DeleteManagerCommand, DeleteManagerError, ListManagersError, ListManagersQuery,
    SaveManagerError, SaveManagerRequest,
};

mod common;
use common::{insert_todo, insert_user, interceptor_over, log_messages, manager_count};

#[derive(Debug, thiserror::Error)]
enum Failed {
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

// ============================================================================
// Audit store
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_append_assigns_id_and_keeps_timestamp(pool: PgPool) -> sqlx::Result<()> {
    let store = PgAuditStore::new(pool.clone());
    let at = (Utc::now() - Duration::minutes(3)).trunc_subsecs(6);

    let record = store.append(NewAuditRecord::new("Manager added", at)).await.unwrap();

    assert!(record.id > 0);
    assert_eq!(record.message, "Manager added");
    assert_eq!(record.created_at, at);
    assert_eq!(log_messages(&pool).await, vec!["Manager added".to_string()]);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_list_returns_newest_first(pool: PgPool) -> sqlx::Result<()> {
    let store = PgAuditStore::new(pool);
    let now = Utc::now();

    store.append(NewAuditRecord::new("first", now - Duration::minutes(2))).await.unwrap();
    store.append(NewAuditRecord::new("third", now)).await.unwrap();
    store.append(NewAuditRecord::new("second", now - Duration::minutes(1))).await.unwrap();

    let records = store.list(&AuditQuery { limit: 2 }).await.unwrap();
    let messages: Vec<_> = records.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(messages, vec!["third", "second"]);

    Ok(())
}

// ============================================================================
// Independent unit of work
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_new_transaction_rolls_back_on_error(pool: PgPool) -> sqlx::Result<()> {
    let result: Result<(), Failed> = db::in_new_transaction(&pool, |tx| {
        Box::pin(async move {
            sqlx::query("INSERT INTO users (email) VALUES ('ghost@example.com')")
                .execute(&mut **tx)
                .await?;
            Err(Failed::Rejected("abort".into()))
        })
    })
    .await;

    assert!(result.is_err());

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await?;
    assert_eq!(users, 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_audit_record_survives_caller_rollback(pool: PgPool) -> sqlx::Result<()> {
    let interceptor = interceptor_over(Arc::new(PgAuditStore::new(pool.clone())));

    let mut outer = pool.begin().await?;
    let outer_ref = &mut outer;

    interceptor
        .audit("save_manager", &[], move || async move {
            sqlx::query("INSERT INTO users (email) VALUES ('temp@example.com')")
                .execute(&mut **outer_ref)
                .await
                .map_err(Failed::from)
        })
        .await
        .unwrap();

    outer.rollback().await?;

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await?;
    assert_eq!(users, 0);
    assert_eq!(log_messages(&pool).await, vec![common::ADDED.to_string()]);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_failed_operation_audit_survives_its_rollback(pool: PgPool) -> sqlx::Result<()> {
    let interceptor = interceptor_over(Arc::new(PgAuditStore::new(pool.clone())));

    let result = interceptor
        .audit("save_manager", &[], || {
            db::in_new_transaction(&pool, |tx| {
                Box::pin(async move {
                    sqlx::query("INSERT INTO users (email) VALUES ('temp@example.com')")
                        .execute(&mut **tx)
                        .await?;
                    Err::<(), _>(Failed::Rejected("Todo not found".into()))
                })
            })
        })
        .await;

    assert!(matches!(result, Err(Intercepted::Operation(Failed::Rejected(_)))));

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await?;
    assert_eq!(users, 0);
    assert_eq!(log_messages(&pool).await, vec![format!("{}: Todo not found", common::ADD_FAILED)]);

    Ok(())
}

// ============================================================================
// save_manager
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_save_manager_success_is_audited(pool: PgPool) -> sqlx::Result<()> {
    let interceptor = interceptor_over(Arc::new(PgAuditStore::new(pool.clone())));
    let owner = insert_user(&pool, "owner@example.com").await;
    let helper = insert_user(&pool, "helper@example.com").await;
    let todo_id = insert_todo(&pool, &owner, "Plan trip").await;

    let response = save::handle_audited(
        &interceptor,
        pool.clone(),
        owner,
        todo_id,
        SaveManagerRequest { manager_user_id: helper.id },
    )
    .await
    .unwrap();

    assert_eq!(response.user.id, helper.id);
    assert_eq!(response.user.email, "helper@example.com");
    assert_eq!(manager_count(&pool, todo_id).await, 1);
    assert_eq!(log_messages(&pool).await, vec![common::ADDED.to_string()]);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_save_manager_missing_todo(pool: PgPool) -> sqlx::Result<()> {
    let interceptor = interceptor_over(Arc::new(PgAuditStore::new(pool.clone())));
    let owner = insert_user(&pool, "owner@example.com").await;

    let result = save::handle_audited(
        &interceptor,
        pool.clone(),
        owner,
        404,
        SaveManagerRequest { manager_user_id: 1 },
    )
    .await;

    assert!(matches!(result, Err(Intercepted::Operation(SaveManagerError::TodoNotFound))));
    assert_eq!(
        log_messages(&pool).await,
        vec![format!("{}: Todo not found", common::ADD_FAILED)]
    );

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_save_manager_rule_order(pool: PgPool) -> sqlx::Result<()> {
    let interceptor = interceptor_over(Arc::new(PgAuditStore::new(pool.clone())));
    let owner = insert_user(&pool, "owner@example.com").await;
    let stranger = insert_user(&pool, "stranger@example.com").await;
    let todo_id = insert_todo(&pool, &owner, "Plan trip").await;

    // Not the owner, even though the manager user is also missing
    let result = save::handle_audited(
        &interceptor,
        pool.clone(),
        stranger.clone(),
        todo_id,
        SaveManagerRequest { manager_user_id: 9999 },
    )
    .await;
    assert!(matches!(result, Err(Intercepted::Operation(SaveManagerError::NotTodoOwner))));

    let result = save::handle_audited(
        &interceptor,
        pool.clone(),
        owner.clone(),
        todo_id,
        SaveManagerRequest { manager_user_id: 9999 },
    )
    .await;
    assert!(matches!(
        result,
        Err(Intercepted::Operation(SaveManagerError::ManagerUserNotFound))
    ));

    let result = save::handle_audited(
        &interceptor,
        pool.clone(),
        owner.clone(),
        todo_id,
        SaveManagerRequest { manager_user_id: owner.id },
    )
    .await;
    assert!(matches!(result, Err(Intercepted::Operation(SaveManagerError::SelfAssignment))));

    assert_eq!(manager_count(&pool, todo_id).await, 0);
    assert_eq!(log_messages(&pool).await.len(), 3);

    Ok(())
}

// ============================================================================
// list_managers / delete_manager
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_list_and_delete_managers(pool: PgPool) -> sqlx::Result<()> {
    let owner = insert_user(&pool, "owner@example.com").await;
    let first = insert_user(&pool, "first@example.com").await;
    let second = insert_user(&pool, "second@example.com").await;
    let todo_id = insert_todo(&pool, &owner, "Plan trip").await;

    for user in [&first, &second] {
        save::handle(
            pool.clone(),
            owner.clone(),
            todo_id,
            SaveManagerRequest { manager_user_id: user.id },
        )
        .await
        .unwrap();
    }

    let managers = list::handle(pool.clone(), ListManagersQuery { todo_id }).await.unwrap();
    let emails: Vec<_> = managers.iter().map(|m| m.user.email.as_str()).collect();
    assert_eq!(emails, vec!["first@example.com", "second@example.com"]);

    let removed = delete::handle(
        pool.clone(),
        owner.clone(),
        DeleteManagerCommand {
            todo_id,
            manager_id: managers[0].id,
        },
    )
    .await
    .unwrap();
    assert_eq!(removed.id, managers[0].id);
    assert_eq!(manager_count(&pool, todo_id).await, 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_list_missing_todo(pool: PgPool) -> sqlx::Result<()> {
    let result = list::handle(pool, ListManagersQuery { todo_id: 12345 }).await;
    assert!(matches!(result, Err(ListManagersError::TodoNotFound)));
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_delete_manager_from_other_todo(pool: PgPool) -> sqlx::Result<()> {
    let owner = insert_user(&pool, "owner@example.com").await;
    let helper = insert_user(&pool, "helper@example.com").await;
    let todo_a = insert_todo(&pool, &owner, "A").await;
    let todo_b = insert_todo(&pool, &owner, "B").await;

    let saved = save::handle(
        pool.clone(),
        owner.clone(),
        todo_a,
        SaveManagerRequest { manager_user_id: helper.id },
    )
    .await
    .unwrap();

    let result = delete::handle(
        pool.clone(),
        owner.clone(),
        DeleteManagerCommand {
            todo_id: todo_b,
            manager_id: saved.id,
        },
    )
    .await;
    assert!(matches!(result, Err(DeleteManagerError::ManagerNotOnTodo { .. })));

    let result = delete::handle(
        pool.clone(),
        helper,
        DeleteManagerCommand {
            todo_id: todo_a,
            manager_id: saved.id,
        },
    )
    .await;
    assert!(matches!(result, Err(DeleteManagerError::NotTodoOwner)));

    let result = delete::handle(
        pool.clone(),
        owner,
        DeleteManagerCommand {
            todo_id: todo_a,
            manager_id: 777,
        },
    )
    .await;
    assert!(matches!(result, Err(DeleteManagerError::ManagerNotFound)));

    assert_eq!(manager_count(&pool, todo_a).await, 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_target_argument_does_not_change_record(pool: PgPool) -> sqlx::Result<()> {
    let interceptor = interceptor_over(Arc::new(PgAuditStore::new(pool.clone())));

    interceptor
        .audit("save_manager", &[AuditArg::Target(5)], || async { Ok::<_, Failed>(()) })
        .await
        .unwrap();

    let records = PgAuditStore::new(pool).list(&AuditQuery::default()).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, common::ADDED);

    Ok(())
}
