//! Audit log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use galleryhub_core::error::{AppError, ErrorKind};
use galleryhub_core::result::AppResult;
use galleryhub_core::types::{AuditLogId, OwnerId};
use galleryhub_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use crate::store::AuditRecorder;

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insert one entry through `executor`, which may be an open transaction.
pub(crate) async fn insert_entry<'e, E>(
    executor: E,
    entry: &CreateAuditLogEntry,
) -> AppResult<AuditLogEntry>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, AuditLogEntry>(
        "INSERT INTO audit_log (id, owner_id, action, target_type, target_id, details, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(AuditLogId::new())
    .bind(entry.owner_id)
    .bind(&entry.action)
    .bind(&entry.target_type)
    .bind(entry.target_id)
    .bind(&entry.details)
    .bind(entry.created_at)
    .fetch_one(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create audit entry", e))
}

#[async_trait]
impl AuditRecorder for AuditLogRepository {
    async fn record(&self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        insert_entry(&self.pool, &entry).await
    }

    async fn entries_for_owner(
        &self,
        owner_id: OwnerId,
        action: Option<&str>,
    ) -> AppResult<Vec<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log WHERE owner_id = $1 AND ($2::TEXT IS NULL OR action = $2) \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .bind(action)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list audit entries", e))
    }
}
