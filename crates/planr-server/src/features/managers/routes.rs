//! Manager API routes
//!
//! # Route Structure
//!
//! - `POST /todos/:todo_id/managers` - Register a manager (audited)
//! - `GET /todos/:todo_id/managers` - List managers of a todo
//! - `DELETE /todos/:todo_id/managers/:manager_id` - Remove a manager

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};

use super::{
    commands::{DeleteManagerCommand, DeleteManagerError, SaveManagerError, SaveManagerRequest},
    queries::{ListManagersError, ListManagersQuery},
};
use crate::api::response::{ApiResponse, ErrorResponse};
use crate::audit::{AuditError, Intercepted};
use crate::features::shared::AuthUser;
use crate::features::FeatureState;

pub fn managers_routes() -> Router<FeatureState> {
    Router::new()
        .route("/:todo_id/managers", get(list_managers).post(save_manager))
        .route("/:todo_id/managers/:manager_id", delete(delete_manager))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Register a manager on a todo
///
/// # Response
///
/// - `201 Created` - Manager registered
/// - `400 Bad Request` - Caller tried to register themself
/// - `401 Unauthorized` - Caller identity headers missing
/// - `403 Forbidden` - Caller does not own the todo
/// - `404 Not Found` - Todo or manager user not found
/// - `500 Internal Server Error` - Database or audit trail failure
#[tracing::instrument(skip(state, auth_user, request), fields(actor = auth_user.id))]
async fn save_manager(
    State(state): State<FeatureState>,
    auth_user: AuthUser,
    Path(todo_id): Path<i64>,
    Json(request): Json<SaveManagerRequest>,
) -> Result<Response, ManagerApiError> {
    let response = super::commands::save::handle_audited(
        &state.interceptor,
        state.db.clone(),
        auth_user,
        todo_id,
        request,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// Remove a manager from a todo
#[tracing::instrument(skip(state, auth_user), fields(actor = auth_user.id))]
async fn delete_manager(
    State(state): State<FeatureState>,
    auth_user: AuthUser,
    Path((todo_id, manager_id)): Path<(i64, i64)>,
) -> Result<Response, ManagerApiError> {
    let command = DeleteManagerCommand {
        todo_id,
        manager_id,
    };

    let response = super::commands::delete::handle(state.db.clone(), auth_user, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(state))]
async fn list_managers(
    State(state): State<FeatureState>,
    Path(todo_id): Path<i64>,
) -> Result<Response, ManagerApiError> {
    let managers =
        super::queries::list::handle(state.db.clone(), ListManagersQuery { todo_id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(managers))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for manager API endpoints
#[derive(Debug)]
pub(crate) enum ManagerApiError {
    Save(SaveManagerError),
    Delete(DeleteManagerError),
    List(ListManagersError),
    Audit(AuditError),
}

impl From<Intercepted<SaveManagerError>> for ManagerApiError {
    fn from(err: Intercepted<SaveManagerError>) -> Self {
        match err {
            Intercepted::Operation(e) => Self::Save(e),
            Intercepted::Audit(e) => Self::Audit(e),
        }
    }
}

impl From<DeleteManagerError> for ManagerApiError {
    fn from(err: DeleteManagerError) -> Self {
        Self::Delete(err)
    }
}

impl From<ListManagersError> for ManagerApiError {
    fn from(err: ListManagersError) -> Self {
        Self::List(err)
    }
}

impl ManagerApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Save(SaveManagerError::TodoNotFound)
            | Self::Save(SaveManagerError::ManagerUserNotFound)
            | Self::Delete(DeleteManagerError::TodoNotFound)
            | Self::Delete(DeleteManagerError::ManagerNotFound)
            | Self::List(ListManagersError::TodoNotFound) => (StatusCode::NOT_FOUND, "NOT_FOUND"),

            Self::Save(SaveManagerError::NotTodoOwner)
            | Self::Delete(DeleteManagerError::NotTodoOwner) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN")
            },

            Self::Save(SaveManagerError::SelfAssignment)
            | Self::Delete(DeleteManagerError::ManagerNotOnTodo { .. }) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            },

            Self::Save(SaveManagerError::Database(_))
            | Self::Delete(DeleteManagerError::Database(_))
            | Self::List(ListManagersError::Database(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            },

            Self::Audit(_) => (StatusCode::INTERNAL_SERVER_ERROR, "AUDIT_ERROR"),
        }
    }
}

impl IntoResponse for ManagerApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Manager request failed");
            match self {
                Self::Audit(_) => "The audit trail could not be written".to_string(),
                _ => "A database error occurred".to_string(),
            }
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

impl std::fmt::Display for ManagerApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Save(e) => write!(f, "{}", e),
            Self::Delete(e) => write!(f, "{}", e),
            Self::List(e) => write!(f, "{}", e),
            Self::Audit(e) => write!(f, "{}", e),
        }
    }
}
