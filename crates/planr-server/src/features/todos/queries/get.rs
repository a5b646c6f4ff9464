use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::todos::types::{TodoResponse, TodoRow};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTodoQuery {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum GetTodoError {
    #[error("Todo not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetTodoQuery) -> Result<TodoResponse, GetTodoError> {
    let row = sqlx::query_as::<_, TodoRow>(
        r#"
        SELECT t.id, t.title, t.contents, t.weather, t.user_id, u.email,
               t.created_at, t.modified_at
        FROM todos t
        LEFT JOIN users u ON u.id = t.user_id
        WHERE t.id = $1
        "#,
    )
    .bind(query.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(GetTodoError::NotFound)?;

    Ok(TodoResponse::from(row))
}
