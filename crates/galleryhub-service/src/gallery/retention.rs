//! Periodic purge of galleries that outstayed the trash retention window.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use galleryhub_core::config::lifecycle::{DEFAULT_RETENTION_DAYS, MAX_RETENTION_DAYS};
use galleryhub_core::error::AppError;
use galleryhub_core::result::AppResult;
use galleryhub_core::traits::Clock;
use galleryhub_core::types::{GalleryId, OwnerId};
use galleryhub_database::{AuditRecorder, GalleryStore};
use galleryhub_entity::audit::{CreateAuditLogEntry, actions};
use galleryhub_entity::gallery::PurgedGallery;

/// Start of the retention window: galleries trashed strictly before the
/// returned instant have expired.
///
/// Windows longer than [`MAX_RETENTION_DAYS`] are rejected.
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: u32) -> AppResult<DateTime<Utc>> {
    if retention_days > MAX_RETENTION_DAYS {
        return Err(AppError::validation(format!(
            "Retention window must be at most {MAX_RETENTION_DAYS} days, got {retention_days}"
        )));
    }
    Duration::try_days(i64::from(retention_days))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            AppError::validation(format!(
                "Retention window of {retention_days} days is out of range"
            ))
        })
}

/// Hard-deletes galleries trashed longer than the retention window.
#[derive(Debug, Clone)]
pub struct RetentionPurger {
    store: Arc<dyn GalleryStore>,
    audit: Arc<dyn AuditRecorder>,
    clock: Arc<dyn Clock>,
    retention_days: u32,
}

impl RetentionPurger {
    /// Creates a new purger with the default 30-day window.
    pub fn new(
        store: Arc<dyn GalleryStore>,
        audit: Arc<dyn AuditRecorder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            audit,
            clock,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }

    /// Override the window used by [`Self::sweep_default`].
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// The configured retention window in days.
    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// [`Self::sweep`] with the configured window.
    pub async fn sweep_default(&self) -> AppResult<Vec<PurgedGallery>> {
        self.sweep(self.retention_days).await
    }

    /// Delete every gallery trashed strictly before `now - retention_days`
    /// in a single batch and return what was removed.
    ///
    /// Nothing expired means no writes. A failed delete fails the whole
    /// sweep; re-running it is safe.
    pub async fn sweep(&self, retention_days: u32) -> AppResult<Vec<PurgedGallery>> {
        let cutoff = retention_cutoff(self.clock.now(), retention_days)?;

        let expired = self.store.find_trashed_before(cutoff).await?;
        if expired.is_empty() {
            debug!(cutoff = %cutoff, "Retention sweep found nothing to purge");
            return Ok(Vec::new());
        }

        let ids: Vec<GalleryId> = expired.iter().map(|g| g.id).collect();
        let purged = self.store.purge_many(&ids, cutoff).await?;

        info!(
            retention_days = retention_days,
            candidates = ids.len(),
            purged = purged.len(),
            "Retention sweep purged galleries"
        );

        self.record_audit(retention_days, &purged).await;
        Ok(purged)
    }

    /// One audit entry per affected owner.
    ///
    /// The rows are already gone at this point and callers need the
    /// summaries to release external state, so an audit failure is logged
    /// rather than returned.
    async fn record_audit(&self, retention_days: u32, purged: &[PurgedGallery]) {
        let mut by_owner: BTreeMap<OwnerId, Vec<&PurgedGallery>> = BTreeMap::new();
        for gallery in purged {
            by_owner.entry(gallery.owner_id).or_default().push(gallery);
        }

        let now = self.clock.now();
        for (owner_id, galleries) in by_owner {
            let entry = CreateAuditLogEntry {
                owner_id,
                action: actions::RETENTION_PURGED.to_string(),
                target_type: "gallery".to_string(),
                target_id: None,
                details: Some(serde_json::json!({
                    "retention_days": retention_days,
                    "purged_count": galleries.len(),
                    "galleries": galleries,
                })),
                created_at: now,
            };
            if let Err(e) = self.audit.record(entry).await {
                warn!(owner_id = %owner_id, error = %e, "Failed to audit retention purge");
            }
        }
    }
}
