//! Todo API routes
//!
//! # Route Structure
//!
//! - `POST /todos` - Create a todo owned by the caller
//! - `GET /todos/:todo_id` - Get a single todo with its owner

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::{
    commands::{SaveTodoError, SaveTodoRequest},
    queries::{GetTodoError, GetTodoQuery},
};
use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::AuthUser;
use crate::features::FeatureState;

pub fn todos_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", post(save_todo))
        .route("/:todo_id", get(get_todo))
}

/// Create a todo
///
/// # Response
///
/// - `201 Created` - Todo created
/// - `400 Bad Request` - Title missing or a field too long
/// - `401 Unauthorized` - Caller identity headers missing
/// - `404 Not Found` - Caller is not a known user
#[tracing::instrument(skip(state, auth_user, request), fields(actor = auth_user.id))]
async fn save_todo(
    State(state): State<FeatureState>,
    auth_user: AuthUser,
    Json(request): Json<SaveTodoRequest>,
) -> Result<Response, TodoApiError> {
    let todo = super::commands::save::handle(state.db.clone(), auth_user, request).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(todo))).into_response())
}

#[tracing::instrument(skip(state))]
async fn get_todo(
    State(state): State<FeatureState>,
    Path(todo_id): Path<i64>,
) -> Result<Response, TodoApiError> {
    let query = GetTodoQuery { id: todo_id };
    let todo = super::queries::get::handle(state.db.clone(), query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(todo))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub(crate) enum TodoApiError {
    Save(SaveTodoError),
    Get(GetTodoError),
}

impl From<SaveTodoError> for TodoApiError {
    fn from(err: SaveTodoError) -> Self {
        Self::Save(err)
    }
}

impl From<GetTodoError> for TodoApiError {
    fn from(err: GetTodoError) -> Self {
        Self::Get(err)
    }
}

impl TodoApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Save(SaveTodoError::TitleRequired)
            | Self::Save(SaveTodoError::TitleTooLong { .. })
            | Self::Save(SaveTodoError::WeatherTooLong { .. }) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            },

            Self::Save(SaveTodoError::UserNotFound) | Self::Get(GetTodoError::NotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            },

            Self::Save(SaveTodoError::Database(_)) | Self::Get(GetTodoError::Database(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            },
        }
    }
}

impl IntoResponse for TodoApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Todo request failed");
            "A database error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

impl std::fmt::Display for TodoApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Save(e) => write!(f, "{}", e),
            Self::Get(e) => write!(f, "{}", e),
        }
    }
}
