use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::managers::types::{ManagerResponse, ManagerRow};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListManagersQuery {
    pub todo_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum ListManagersError {
    #[error("Todo not found")]
    TodoNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Managers registered on a todo, ordered by registration id
#[tracing::instrument(skip(pool, query), fields(todo_id = query.todo_id))]
pub async fn handle(
    pool: PgPool,
    query: ListManagersQuery,
) -> Result<Vec<ManagerResponse>, ListManagersError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM todos WHERE id = $1)")
        .bind(query.todo_id)
        .fetch_one(&pool)
        .await?;

    if !exists {
        return Err(ListManagersError::TodoNotFound);
    }

    let rows = sqlx::query_as::<_, ManagerRow>(
        r#"
        SELECT m.id, u.id AS user_id, u.email
        FROM managers m
        JOIN users u ON u.id = m.user_id
        WHERE m.todo_id = $1
        ORDER BY m.id
        "#,
    )
    .bind(query.todo_id)
    .fetch_all(&pool)
    .await?;

    tracing::debug!(count = rows.len(), "Listed managers");

    Ok(rows.into_iter().map(ManagerResponse::from).collect())
}
