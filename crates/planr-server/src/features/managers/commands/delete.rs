use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::AuthUser;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteManagerCommand {
    pub todo_id: i64,
    pub manager_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteManagerResponse {
    pub id: i64,
    pub todo_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteManagerError {
    #[error("Todo not found")]
    TodoNotFound,

    #[error("Only the user who created the todo can remove managers")]
    NotTodoOwner,

    #[error("Manager not found")]
    ManagerNotFound,

    #[error("Manager {manager_id} is not registered on todo {todo_id}")]
    ManagerNotOnTodo { manager_id: i64, todo_id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Remove a manager registration from a todo owned by the caller
#[tracing::instrument(
    skip(pool, auth_user, command),
    fields(actor = auth_user.id, todo_id = command.todo_id, manager_id = command.manager_id)
)]
pub async fn handle(
    pool: PgPool,
    auth_user: AuthUser,
    command: DeleteManagerCommand,
) -> Result<DeleteManagerResponse, DeleteManagerError> {
    let mut tx = pool.begin().await?;

    let owner: Option<i64> = sqlx::query_scalar("SELECT user_id FROM todos WHERE id = $1")
        .bind(command.todo_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DeleteManagerError::TodoNotFound)?;

    if owner != Some(auth_user.id) {
        return Err(DeleteManagerError::NotTodoOwner);
    }

    let manager_todo_id: i64 = sqlx::query_scalar("SELECT todo_id FROM managers WHERE id = $1")
        .bind(command.manager_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DeleteManagerError::ManagerNotFound)?;

    if manager_todo_id != command.todo_id {
        return Err(DeleteManagerError::ManagerNotOnTodo {
            manager_id: command.manager_id,
            todo_id: command.todo_id,
        });
    }

    sqlx::query("DELETE FROM managers WHERE id = $1")
        .bind(command.manager_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Manager removed");

    Ok(DeleteManagerResponse {
        id: command.manager_id,
        todo_id: command.todo_id,
    })
}
