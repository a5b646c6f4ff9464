//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::audit::AuditError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Audit(ref e) => {
                tracing::error!(error = %e, "Audit error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AUDIT_ERROR",
                    "The audit trail is unavailable".to_string(),
                )
            },
            AppError::Unauthorized(ref message) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message.clone())
            },
            AppError::Unavailable(ref message) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", message.clone())
            },
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
