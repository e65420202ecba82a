//! Gallery repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use galleryhub_core::error::{AppError, ErrorKind};
use galleryhub_core::result::AppResult;
use galleryhub_core::types::{GalleryId, OwnerId};
use galleryhub_entity::audit::CreateAuditLogEntry;
use galleryhub_entity::gallery::{Gallery, GalleryStatus, NewGallery, PurgedGallery};
use galleryhub_entity::plan::Limit;

use super::audit::insert_entry;
use crate::store::{
    ChangeOutcome, GalleryRename, GalleryStore, InsertOutcome, SlugLookup, StatusChange,
};

const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";

/// PostgreSQL-backed [`GalleryStore`].
#[derive(Debug, Clone)]
pub struct GalleryRepository {
    pool: PgPool,
}

impl GalleryRepository {
    /// Create a new gallery repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_serializable(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to set isolation level", e)
            })?;
        Ok(tx)
    }

    /// Distinguish "not yours" from "wrong state" after a guarded write
    /// matched no row.
    async fn diagnose_miss(&self, owner_id: OwnerId, id: GalleryId) -> AppResult<ChangeOutcome> {
        Ok(match self.find_owned(owner_id, id).await? {
            Some(gallery) => ChangeOutcome::StateChanged(gallery.status),
            None => ChangeOutcome::NotFound,
        })
    }
}

async fn count_active(conn: &mut PgConnection, owner_id: OwnerId) -> AppResult<u64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM galleries WHERE owner_id = $1 AND status = $2")
            .bind(owner_id)
            .bind(GalleryStatus::Active)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count active galleries", e)
            })?;
    Ok(count as u64)
}

/// Map a write failure, surfacing slug collisions and serialization
/// conflicts as `Conflict` instead of a generic database fault.
fn map_write_error(e: sqlx::Error, context: &str) -> AppError {
    let code = e
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.into_owned());

    match code.as_deref() {
        Some(UNIQUE_VIOLATION) => {
            AppError::with_source(ErrorKind::Conflict, "Gallery slug is already taken", e)
        }
        Some(SERIALIZATION_FAILURE) => AppError::with_source(
            ErrorKind::Conflict,
            "The gallery was modified concurrently, please retry",
            e,
        ),
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
    }
}

fn uuids(ids: &[GalleryId]) -> Vec<Uuid> {
    ids.iter().map(|id| id.into_uuid()).collect()
}

#[async_trait]
impl SlugLookup for GalleryRepository {
    async fn slug_exists(&self, slug: &str, exclude: Option<GalleryId>) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM galleries WHERE slug = $1 AND ($2::UUID IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check slug", e))
    }
}

#[async_trait]
impl GalleryStore for GalleryRepository {
    async fn find_owned(&self, owner_id: OwnerId, id: GalleryId) -> AppResult<Option<Gallery>> {
        sqlx::query_as::<_, Gallery>("SELECT * FROM galleries WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find gallery", e))
    }

    async fn list_by_owner(
        &self,
        owner_id: OwnerId,
        status: Option<GalleryStatus>,
    ) -> AppResult<Vec<Gallery>> {
        sqlx::query_as::<_, Gallery>(
            "SELECT * FROM galleries \
             WHERE owner_id = $1 AND ($2::gallery_status IS NULL OR status = $2) \
             ORDER BY event_date DESC, id ASC",
        )
        .bind(owner_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list galleries", e))
    }

    async fn count_by_status(&self, owner_id: OwnerId, status: GalleryStatus) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM galleries WHERE owner_id = $1 AND status = $2",
        )
        .bind(owner_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count galleries", e))?;
        Ok(count as u64)
    }

    async fn insert_within_quota(
        &self,
        gallery: &NewGallery,
        limit: Limit,
    ) -> AppResult<InsertOutcome> {
        let mut tx = self.begin_serializable().await?;

        let current = count_active(&mut tx, gallery.owner_id).await?;
        if !limit.allows(current) {
            return Ok(InsertOutcome::QuotaExceeded { current });
        }

        let inserted = sqlx::query_as::<_, Gallery>(
            "INSERT INTO galleries \
             (id, owner_id, slug, title, event_date, status, show_on_profile, trashed_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, $8, $8) RETURNING *",
        )
        .bind(gallery.id)
        .bind(gallery.owner_id)
        .bind(&gallery.slug)
        .bind(&gallery.title)
        .bind(gallery.event_date)
        .bind(GalleryStatus::Active)
        .bind(gallery.show_on_profile)
        .bind(gallery.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to insert gallery"))?;

        tx.commit()
            .await
            .map_err(|e| map_write_error(e, "Failed to commit gallery insert"))?;
        Ok(InsertOutcome::Inserted(inserted))
    }

    async fn change_status(&self, change: &StatusChange) -> AppResult<ChangeOutcome> {
        let mut tx = self.begin_serializable().await?;

        let current = sqlx::query_as::<_, Gallery>(
            "SELECT * FROM galleries WHERE id = $1 AND owner_id = $2 FOR UPDATE",
        )
        .bind(change.gallery_id)
        .bind(change.owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to lock gallery"))?;

        let Some(current) = current else {
            return Ok(ChangeOutcome::NotFound);
        };
        if current.status != change.from {
            return Ok(ChangeOutcome::StateChanged(current.status));
        }
        if let (GalleryStatus::Active, Some(limit)) = (change.to, change.active_limit) {
            let active = count_active(&mut tx, change.owner_id).await?;
            if !limit.allows(active) {
                return Ok(ChangeOutcome::QuotaExceeded { current: active });
            }
        }

        let trashed_at = (change.to == GalleryStatus::Trashed).then_some(change.at);
        let updated = sqlx::query_as::<_, Gallery>(
            "UPDATE galleries SET status = $2, trashed_at = $3, updated_at = $4 \
             WHERE id = $1 RETURNING *",
        )
        .bind(change.gallery_id)
        .bind(change.to)
        .bind(trashed_at)
        .bind(change.at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to update gallery status"))?;

        tx.commit()
            .await
            .map_err(|e| map_write_error(e, "Failed to commit status change"))?;
        Ok(ChangeOutcome::Applied(updated))
    }

    async fn set_visibility(
        &self,
        owner_id: OwnerId,
        id: GalleryId,
        show_on_profile: bool,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Gallery>> {
        sqlx::query_as::<_, Gallery>(
            "UPDATE galleries SET show_on_profile = $3, updated_at = $4 \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(show_on_profile)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update gallery visibility", e)
        })
    }

    async fn rename(&self, rename: &GalleryRename) -> AppResult<ChangeOutcome> {
        let updated = sqlx::query_as::<_, Gallery>(
            "UPDATE galleries SET title = $3, event_date = $4, slug = $5, updated_at = $6 \
             WHERE id = $1 AND owner_id = $2 AND status = $7 RETURNING *",
        )
        .bind(rename.gallery_id)
        .bind(rename.owner_id)
        .bind(&rename.title)
        .bind(rename.event_date)
        .bind(&rename.slug)
        .bind(rename.at)
        .bind(GalleryStatus::Active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to rename gallery"))?;

        match updated {
            Some(gallery) => Ok(ChangeOutcome::Applied(gallery)),
            None => self.diagnose_miss(rename.owner_id, rename.gallery_id).await,
        }
    }

    async fn purge(&self, owner_id: OwnerId, id: GalleryId) -> AppResult<ChangeOutcome> {
        let deleted = sqlx::query_as::<_, Gallery>(
            "DELETE FROM galleries WHERE id = $1 AND owner_id = $2 AND status = $3 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(GalleryStatus::Trashed)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge gallery", e))?;

        match deleted {
            Some(gallery) => Ok(ChangeOutcome::Applied(gallery)),
            None => self.diagnose_miss(owner_id, id).await,
        }
    }

    async fn archive_many(
        &self,
        owner_id: OwnerId,
        ids: &[GalleryId],
        at: DateTime<Utc>,
        audit: &(dyn for<'g> Fn(&'g [GalleryId]) -> CreateAuditLogEntry + Send + Sync),
    ) -> AppResult<Vec<GalleryId>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let updated: Vec<GalleryId> = if ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_scalar::<_, GalleryId>(
                "UPDATE galleries SET status = $3, updated_at = $4 \
                 WHERE owner_id = $1 AND id = ANY($2) AND status = $5 RETURNING id",
            )
            .bind(owner_id)
            .bind(uuids(ids))
            .bind(GalleryStatus::Archived)
            .bind(at)
            .bind(GalleryStatus::Active)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to archive galleries", e)
            })?
        };

        // RETURNING order is unspecified; report in the caller's order.
        let archived: Vec<GalleryId> = ids
            .iter()
            .copied()
            .filter(|id| updated.contains(id))
            .collect();

        insert_entry(&mut *tx, &audit(&archived)).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit archive batch", e)
        })?;
        Ok(archived)
    }

    async fn find_trashed_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Gallery>> {
        sqlx::query_as::<_, Gallery>(
            "SELECT * FROM galleries WHERE status = $1 AND trashed_at < $2 \
             ORDER BY trashed_at ASC, id ASC",
        )
        .bind(GalleryStatus::Trashed)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find expired galleries", e)
        })
    }

    async fn purge_many(
        &self,
        ids: &[GalleryId],
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<PurgedGallery>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, PurgedGallery>(
            "DELETE FROM galleries WHERE id = ANY($1) AND status = $2 AND trashed_at < $3 \
             RETURNING id, owner_id, slug",
        )
        .bind(uuids(ids))
        .bind(GalleryStatus::Trashed)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge galleries", e))
    }
}
