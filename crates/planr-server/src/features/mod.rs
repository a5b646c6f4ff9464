//! Feature modules implementing the planr API
//!
//! Each feature is a vertical slice with its own `commands/` (writes),
//! `queries/` (reads) and `routes.rs`. Commands that must leave an audit
//! trail go through the [`AuditInterceptor`] carried in [`FeatureState`].
//!
//! # Features
//!
//! - **todos**: creating and reading todos
//! - **managers**: manager registrations on todos
//! - **shared**: caller identity and other cross-feature types

pub mod managers;
pub mod shared;
pub mod todos;

use axum::Router;

use crate::audit::AuditInterceptor;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for business transactions
    pub db: sqlx::PgPool,
    /// Wraps audited commands
    pub interceptor: AuditInterceptor,
}

/// Creates the feature router
///
/// - `/todos` - Todos and their manager registrations
pub fn router(state: FeatureState) -> Router<()> {
    let todos = todos::todos_routes().merge(managers::managers_routes());

    Router::new().nest("/todos", todos.with_state(state))
}
