//! Application state shared across all handlers.

use std::sync::Arc;

use galleryhub_core::config::AppConfig;
use galleryhub_core::traits::Clock;
use galleryhub_database::{AuditRecorder, DatabasePool, GalleryStore};
use galleryhub_entity::plan::PermissionMatrix;
use galleryhub_service::{
    DowngradeReconciler, LifecycleManager, PlanCatalog, QuotaGuard, RetentionPurger,
    SlugGenerator,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool, absent when running on the in-memory store
    pub db: Option<DatabasePool>,
    /// Entitlement matrix in force
    pub matrix: Arc<PermissionMatrix>,

    // ── Services ─────────────────────────────────────────────
    /// Gallery lifecycle operations
    pub lifecycle: Arc<LifecycleManager>,
    /// Plan catalogue queries
    pub catalog: Arc<PlanCatalog>,
    /// Downgrade reconciliation
    pub reconciler: Arc<DowngradeReconciler>,
    /// Trash retention sweep
    pub purger: Arc<RetentionPurger>,
}

impl AppState {
    /// Wire the services over the given store, audit sink and clock.
    pub fn build(
        config: AppConfig,
        store: Arc<dyn GalleryStore>,
        audit: Arc<dyn AuditRecorder>,
        clock: Arc<dyn Clock>,
        matrix: Arc<PermissionMatrix>,
    ) -> Self {
        let quota = QuotaGuard::new(Arc::clone(&store), Arc::clone(&matrix));
        let slugs = SlugGenerator::new(config.lifecycle.slug_title_max_len);

        let lifecycle = LifecycleManager::new(Arc::clone(&store), quota, slugs, Arc::clone(&clock));
        let reconciler = DowngradeReconciler::new(Arc::clone(&store), Arc::clone(&clock));
        let purger = RetentionPurger::new(store, audit, clock)
            .with_retention_days(config.lifecycle.retention_days);

        Self {
            config: Arc::new(config),
            db: None,
            catalog: Arc::new(PlanCatalog::new(Arc::clone(&matrix))),
            matrix,
            lifecycle: Arc::new(lifecycle),
            reconciler: Arc::new(reconciler),
            purger: Arc::new(purger),
        }
    }

    /// Attach the database pool used by the health check.
    pub fn with_database(mut self, db: DatabasePool) -> Self {
        self.db = Some(db);
        self
    }
}
