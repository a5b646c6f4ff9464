pub mod response;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use crate::audit::{
    AuditInterceptor, AuditQuery, AuditRegistry, AuditStore, AuditWriter, PgAuditStore,
};
use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::features;
use crate::middleware;
use response::ApiResponse;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub audit_store: Arc<dyn AuditStore>,
    pub interceptor: AuditInterceptor,
}

impl AppState {
    /// Wire the audit pipeline over `store`
    pub fn new(db: PgPool, audit_store: Arc<dyn AuditStore>, registry: AuditRegistry) -> Self {
        let interceptor =
            AuditInterceptor::new(AuditWriter::new(audit_store.clone()), Arc::new(registry));

        Self {
            db,
            audit_store,
            interceptor,
        }
    }
}

/// Connect, migrate and serve until a shutdown signal arrives
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let registry = AuditRegistry::from_config(&config.audit)?;

    let pool = db::create_pool(&db::DbConfig::from(&config.database)).await?;
    info!("Database connection pool established");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    info!("Database migrations completed");

    let audit_store: Arc<dyn AuditStore> = Arc::new(PgAuditStore::new(pool.clone()));
    let state = AppState::new(pool, audit_store, registry);
    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, config: &Config) -> Router {
    let feature_state = features::FeatureState {
        db: state.db.clone(),
        interceptor: state.interceptor.clone(),
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/audit", get(list_audit_records))
        .with_state(state)
        .merge(features::router(feature_state))
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn health_check(State(state): State<AppState>) -> Result<Response, AppError> {
    db::health_check(&state.db).await.map_err(|e| {
        tracing::error!(error = %e, "Database health check failed");
        AppError::Unavailable("Database is unreachable".to_string())
    })?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "database": "connected"
        })),
    )
        .into_response())
}

/// Newest audit records first
async fn list_audit_records(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Response, AppError> {
    let records = state.audit_store.list(&query).await?;

    let meta = json!({
        "limit": query.effective_limit(),
        "count": records.len(),
    });

    Ok(ApiResponse::success_with_meta(records, meta).into_response())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
