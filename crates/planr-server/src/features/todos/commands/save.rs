//! Create a todo owned by the caller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::{AuthUser, UserResponse};
use crate::features::todos::types::TodoResponse;

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_WEATHER_LENGTH: usize = 64;

/// Request body for creating a todo
///
/// `weather` is stored as given; nothing looks it up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveTodoRequest {
    pub title: String,

    #[serde(default)]
    pub contents: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveTodoError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Title must be at most {max} characters")]
    TitleTooLong { max: usize },

    #[error("Weather must be at most {max} characters")]
    WeatherTooLong { max: usize },

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SaveTodoRequest {
    pub fn validate(&self) -> Result<(), SaveTodoError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(SaveTodoError::TitleRequired);
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(SaveTodoError::TitleTooLong {
                max: MAX_TITLE_LENGTH,
            });
        }
        if let Some(weather) = &self.weather {
            if weather.chars().count() > MAX_WEATHER_LENGTH {
                return Err(SaveTodoError::WeatherTooLong {
                    max: MAX_WEATHER_LENGTH,
                });
            }
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, auth_user, request), fields(actor = auth_user.id))]
pub async fn handle(
    pool: PgPool,
    auth_user: AuthUser,
    request: SaveTodoRequest,
) -> Result<TodoResponse, SaveTodoError> {
    request.validate()?;

    let mut tx = pool.begin().await?;

    let owner = sqlx::query_as::<_, UserResponse>("SELECT id, email FROM users WHERE id = $1")
        .bind(auth_user.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(SaveTodoError::UserNotFound)?;

    let title = request.title.trim().to_string();

    let (id, created_at, modified_at): (i64, DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
        r#"
        INSERT INTO todos (title, contents, weather, user_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, created_at, modified_at
        "#,
    )
    .bind(&title)
    .bind(&request.contents)
    .bind(&request.weather)
    .bind(owner.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(todo_id = id, "Todo created");

    Ok(TodoResponse {
        id,
        title,
        contents: request.contents,
        weather: request.weather,
        user: Some(owner),
        created_at,
        modified_at,
    })
}
