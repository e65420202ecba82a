//! Application builder: wires router, layers, services and the scheduler.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use galleryhub_core::config::AppConfig;
use galleryhub_core::error::AppError;
use galleryhub_core::traits::SystemClock;
use galleryhub_database::{AuditRecorder, DatabasePool, GalleryStore};
use galleryhub_entity::plan::PermissionMatrix;
use galleryhub_worker::{CronScheduler, JobExecutor, RetentionJobHandler};

use crate::middleware::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and layers.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the GalleryHub server against `db` until Ctrl+C.
pub async fn run_server(config: AppConfig, db: DatabasePool) -> Result<(), AppError> {
    tracing::info!("Starting GalleryHub server...");

    // ── Step 1: Stores ───────────────────────────────────────────
    let store: Arc<dyn GalleryStore> = Arc::new(db.galleries());
    let audit: Arc<dyn AuditRecorder> = Arc::new(db.audit_log());

    // ── Step 2: Services ─────────────────────────────────────────
    let matrix = Arc::new(PermissionMatrix::standard().clone());
    tracing::info!("Entitlement matrix version {}", matrix.version());

    let addr = config.server.bind_address();
    let worker_config = config.worker.clone();
    let state = AppState::build(config, store, audit, Arc::new(SystemClock), matrix)
        .with_database(db.clone());

    // ── Step 3: Scheduler ────────────────────────────────────────
    let mut scheduler = if worker_config.enabled {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(RetentionJobHandler::new(
            state.purger.as_ref().clone(),
        )));

        tracing::info!("Job handlers: {:?}", executor.registered_types());

        let scheduler = CronScheduler::new(Arc::new(executor)).await?;
        scheduler.register_default_tasks(&worker_config).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Scheduler disabled; retention sweeps must be triggered manually");
        None
    };

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("GalleryHub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    db.close().await;

    tracing::info!("GalleryHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
