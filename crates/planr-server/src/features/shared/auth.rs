//! Caller identity extracted from request headers
//!
//! Authentication happens upstream; by the time a request reaches the
//! server the gateway has stamped it with `x-user-id` and `x-user-email`.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::audit::ActorIdentity;
use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

impl ActorIdentity for AuthUser {
    fn actor_id(&self) -> i64 {
        self.id
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", name)))
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, USER_ID_HEADER)?.parse::<i64>().map_err(|_| {
            AppError::Unauthorized(format!("Invalid {} header", USER_ID_HEADER))
        })?;
        let email = header(parts, USER_EMAIL_HEADER)?.to_string();

        Ok(AuthUser { id, email })
    }
}
