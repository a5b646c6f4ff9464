//! Shared fixtures for planr server integration tests

#![allow(dead_code)]

use sqlx::PgPool;
use std::sync::Arc;

use planr_server::audit::{
    AuditInterceptor, AuditMessages, AuditRegistry, AuditStore, AuditWriter, MemoryAuditStore,
};
use planr_server::features::shared::AuthUser;

pub const ADDED: &str = "M-added";
pub const ADD_FAILED: &str = "M-add-failed";

pub fn registry() -> AuditRegistry {
    AuditRegistry::default().register("save_manager", AuditMessages::new(ADDED, ADD_FAILED))
}

pub fn interceptor_over(store: Arc<dyn AuditStore>) -> AuditInterceptor {
    AuditInterceptor::new(AuditWriter::new(store), Arc::new(registry()))
}

pub fn memory_interceptor() -> (Arc<MemoryAuditStore>, AuditInterceptor) {
    let store = Arc::new(MemoryAuditStore::new());
    let interceptor = interceptor_over(store.clone());
    (store, interceptor)
}

pub async fn insert_user(pool: &PgPool, email: &str) -> AuthUser {
    let id: i64 = sqlx::query_scalar("INSERT INTO users (email) VALUES ($1) RETURNING id")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap();

    AuthUser {
        id,
        email: email.to_string(),
    }
}

pub async fn insert_todo(pool: &PgPool, owner: &AuthUser, title: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO todos (title, user_id) VALUES ($1, $2) RETURNING id")
        .bind(title)
        .bind(owner.id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn log_messages(pool: &PgPool) -> Vec<String> {
    sqlx::query_scalar("SELECT message FROM log ORDER BY id")
        .fetch_all(pool)
        .await
        .unwrap()
}

pub async fn manager_count(pool: &PgPool, todo_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM managers WHERE todo_id = $1")
        .bind(todo_id)
        .fetch_one(pool)
        .await
        .unwrap()
}
