//! Register a manager on a todo
//!
//! The business work runs in its own transaction. [`handle_audited`] wraps it
//! in the audit interceptor so every attempt, accepted or rejected, leaves a
//! record in the audit trail.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::audit::{classify, operations, AuditArg, AuditInterceptor, Intercepted, SubjectRequest};
use crate::features::managers::types::{ManagerResponse, UserResponse};
use crate::features::shared::AuthUser;

/// Request body for registering a manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveManagerRequest {
    pub manager_user_id: i64,
}

impl SubjectRequest for SaveManagerRequest {
    fn subject_id(&self) -> i64 {
        self.manager_user_id
    }
}

pub type SaveManagerResponse = ManagerResponse;

#[derive(Debug, thiserror::Error)]
pub enum SaveManagerError {
    #[error("Todo not found")]
    TodoNotFound,

    #[error("Only the user who created the todo can register managers")]
    NotTodoOwner,

    #[error("Manager user not found")]
    ManagerUserNotFound,

    #[error("The todo owner cannot register themself as a manager")]
    SelfAssignment,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Validate and insert a manager registration
///
/// Rules are checked in order: the todo exists, the caller owns it, the
/// manager user exists, and the caller is not registering themself. Any
/// rejection rolls the transaction back.
#[tracing::instrument(
    skip(pool, auth_user, request),
    fields(actor = auth_user.id, manager_user_id = request.manager_user_id)
)]
pub async fn handle(
    pool: PgPool,
    auth_user: AuthUser,
    todo_id: i64,
    request: SaveManagerRequest,
) -> Result<SaveManagerResponse, SaveManagerError> {
    let mut tx = pool.begin().await?;

    let owner: Option<i64> = sqlx::query_scalar("SELECT user_id FROM todos WHERE id = $1")
        .bind(todo_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(SaveManagerError::TodoNotFound)?;

    if owner != Some(auth_user.id) {
        return Err(SaveManagerError::NotTodoOwner);
    }

    let manager_user =
        sqlx::query_as::<_, UserResponse>("SELECT id, email FROM users WHERE id = $1")
            .bind(request.manager_user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(SaveManagerError::ManagerUserNotFound)?;

    if manager_user.id == auth_user.id {
        return Err(SaveManagerError::SelfAssignment);
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO managers (user_id, todo_id)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(manager_user.id)
    .bind(todo_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(manager_id = id, "Manager registered");

    Ok(SaveManagerResponse {
        id,
        user: manager_user,
    })
}

/// [`handle`] under the `save_manager` audit messages
///
/// The interception runs on its own task, so a dropped request cannot leave a
/// committed registration without its audit record.
pub async fn handle_audited(
    interceptor: &AuditInterceptor,
    pool: PgPool,
    auth_user: AuthUser,
    todo_id: i64,
    request: SaveManagerRequest,
) -> Result<SaveManagerResponse, Intercepted<SaveManagerError>> {
    let roles = classify(&[
        AuditArg::Actor(&auth_user),
        AuditArg::Target(todo_id),
        AuditArg::Subject(&request),
    ]);

    interceptor
        .audit_detached(operations::SAVE_MANAGER, roles, move || {
            handle(pool, auth_user, todo_id, request)
        })
        .await
}
