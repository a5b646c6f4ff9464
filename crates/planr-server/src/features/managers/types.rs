use serde::{Deserialize, Serialize};

pub use crate::features::shared::UserResponse;

/// A manager registration together with the managing user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerResponse {
    pub id: i64,
    pub user: UserResponse,
}

/// Joined `managers` + `users` row
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ManagerRow {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
}

impl From<ManagerRow> for ManagerResponse {
    fn from(row: ManagerRow) -> Self {
        Self {
            id: row.id,
            user: UserResponse {
                id: row.user_id,
                email: row.email,
            },
        }
    }
}
