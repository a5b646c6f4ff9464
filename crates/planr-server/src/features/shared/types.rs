use serde::{Deserialize, Serialize};

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}
