use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::shared::UserResponse;

/// A todo together with the user who created it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoResponse {
    pub id: i64,
    pub title: String,
    pub contents: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    pub user: Option<UserResponse>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// `todos` row left-joined with its owner
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TodoRow {
    pub id: i64,
    pub title: String,
    pub contents: String,
    pub weather: Option<String>,
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<TodoRow> for TodoResponse {
    fn from(row: TodoRow) -> Self {
        let user = match (row.user_id, row.email) {
            (Some(id), Some(email)) => Some(UserResponse { id, email }),
            _ => None,
        };

        Self {
            id: row.id,
            title: row.title,
            contents: row.contents,
            weather: row.weather,
            user,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}
