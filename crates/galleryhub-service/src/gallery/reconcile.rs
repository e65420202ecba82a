//! Archive excess galleries after a plan downgrade.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use galleryhub_core::result::AppResult;
use galleryhub_core::traits::Clock;
use galleryhub_core::types::{GalleryId, OwnerId};
use galleryhub_database::GalleryStore;
use galleryhub_entity::audit::{CreateAuditLogEntry, actions};
use galleryhub_entity::gallery::GalleryStatus;
use galleryhub_entity::plan::{Limit, PermissionMatrix, PlanTier};

/// A tier change reported by the billing workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DowngradeEvent {
    pub owner_id: OwnerId,
    /// Previous tier, when the billing system knows it.
    pub old_tier: Option<PlanTier>,
    pub new_tier: PlanTier,
    /// Active-gallery limit to enforce.
    pub new_limit: Limit,
}

impl DowngradeEvent {
    /// Event whose limit is the gallery quota of `new_tier` in `matrix`.
    pub fn for_tier(
        owner_id: OwnerId,
        old_tier: Option<PlanTier>,
        new_tier: PlanTier,
        matrix: &PermissionMatrix,
    ) -> Self {
        Self {
            owner_id,
            old_tier,
            new_tier,
            new_limit: matrix.max_galleries(new_tier),
        }
    }
}

/// What a reconciliation did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub owner_id: OwnerId,
    pub old_tier: Option<PlanTier>,
    pub new_tier: PlanTier,
    pub new_limit: Limit,
    /// Active galleries before the run.
    pub active_before: u64,
    pub archived_count: u64,
    /// Galleries moved to Archived, most recent first.
    pub archived_ids: Vec<GalleryId>,
    pub reconciled_at: DateTime<Utc>,
}

/// Keeps an owner's Active set within a new, lower limit.
#[derive(Debug, Clone)]
pub struct DowngradeReconciler {
    store: Arc<dyn GalleryStore>,
    clock: Arc<dyn Clock>,
}

impl DowngradeReconciler {
    /// Creates a new downgrade reconciler.
    pub fn new(store: Arc<dyn GalleryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Keep the `new_limit` most recent Active galleries and archive the
    /// rest in one batch, together with its audit entry. An entry is
    /// recorded even when nothing needed archiving. If either write fails
    /// neither happens, so re-running is safe.
    pub async fn reconcile(&self, event: &DowngradeEvent) -> AppResult<ReconcileReport> {
        let now = self.clock.now();

        // Ordered by event date desc, then id: the keep set is stable across runs.
        let active = self
            .store
            .list_by_owner(event.owner_id, Some(GalleryStatus::Active))
            .await?;
        let active_before = active.len() as u64;

        let excess: Vec<GalleryId> = match event.new_limit {
            Limit::Count(keep) if active.len() > keep as usize => {
                active[keep as usize..].iter().map(|g| g.id).collect()
            }
            _ => Vec::new(),
        };

        let audit_entry = |archived: &[GalleryId]| CreateAuditLogEntry {
            owner_id: event.owner_id,
            action: actions::DOWNGRADE_RECONCILED.to_string(),
            target_type: "owner".to_string(),
            target_id: Some(event.owner_id.into_uuid()),
            details: Some(serde_json::json!({
                "old_tier": event.old_tier,
                "new_tier": event.new_tier,
                "new_limit": event.new_limit,
                "active_before": active_before,
                "archived_count": archived.len(),
                "archived_ids": archived,
            })),
            created_at: now,
        };

        let archived_ids = self
            .store
            .archive_many(event.owner_id, &excess, now, &audit_entry)
            .await?;
        let archived_count = archived_ids.len() as u64;

        info!(
            owner_id = %event.owner_id,
            new_tier = %event.new_tier,
            new_limit = %event.new_limit,
            active_before = active_before,
            archived_count = archived_count,
            "Downgrade reconciled"
        );

        Ok(ReconcileReport {
            owner_id: event.owner_id,
            old_tier: event.old_tier,
            new_tier: event.new_tier,
            new_limit: event.new_limit,
            active_before,
            archived_count,
            archived_ids,
            reconciled_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use galleryhub_core::traits::ManualClock;
    use galleryhub_database::MemoryGalleryStore;
    use galleryhub_entity::gallery::NewGallery;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
        ))
    }

    async fn seed_active(store: &MemoryGalleryStore, owner: OwnerId, day: u32) -> GalleryId {
        let gallery = NewGallery {
            id: GalleryId::new(),
            owner_id: owner,
            slug: format!("o/2026/03/{day:02}/g"),
            title: "g".into(),
            event_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            show_on_profile: true,
            created_at: Utc::now(),
        }
        .into_gallery();
        let id = gallery.id;
        store.seed(gallery).await;
        id
    }

    #[tokio::test]
    async fn test_unlimited_archives_nothing_but_audits() {
        let store = Arc::new(MemoryGalleryStore::new());
        let owner = OwnerId::new();
        for day in 1..=4 {
            seed_active(&store, owner, day).await;
        }
        let reconciler = DowngradeReconciler::new(store.clone(), clock());

        let report = reconciler
            .reconcile(&DowngradeEvent {
                owner_id: owner,
                old_tier: None,
                new_tier: PlanTier::Premium,
                new_limit: Limit::Unlimited,
            })
            .await
            .unwrap();
        assert_eq!(report.archived_count, 0);
        assert_eq!(report.active_before, 4);
        assert_eq!(store.audit_entries().await.len(), 1);
    }

    #[tokio::test]
    async fn test_limit_zero_archives_everything() {
        let store = Arc::new(MemoryGalleryStore::new());
        let owner = OwnerId::new();
        seed_active(&store, owner, 1).await;
        seed_active(&store, owner, 2).await;
        let reconciler = DowngradeReconciler::new(store.clone(), clock());

        let report = reconciler
            .reconcile(&DowngradeEvent {
                owner_id: owner,
                old_tier: Some(PlanTier::Start),
                new_tier: PlanTier::Free,
                new_limit: Limit::Count(0),
            })
            .await
            .unwrap();
        assert_eq!(report.archived_count, 2);
        assert_eq!(
            store
                .count_by_status(owner, GalleryStatus::Active)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_failed_audit_leaves_galleries_active_and_retry_records_them() {
        let store = Arc::new(MemoryGalleryStore::new());
        let owner = OwnerId::new();
        let oldest = seed_active(&store, owner, 1).await;
        seed_active(&store, owner, 2).await;
        seed_active(&store, owner, 3).await;
        let reconciler = DowngradeReconciler::new(store.clone(), clock());
        let event = DowngradeEvent {
            owner_id: owner,
            old_tier: Some(PlanTier::Start),
            new_tier: PlanTier::Free,
            new_limit: Limit::Count(2),
        };

        store.set_audit_offline(true).await;
        let err = reconciler.reconcile(&event).await.unwrap_err();
        assert_eq!(err.kind, galleryhub_core::error::ErrorKind::Database);
        assert_eq!(
            store
                .count_by_status(owner, GalleryStatus::Active)
                .await
                .unwrap(),
            3
        );
        assert!(store.audit_entries().await.is_empty());

        store.set_audit_offline(false).await;
        let report = reconciler.reconcile(&event).await.unwrap();
        assert_eq!(report.archived_ids, vec![oldest]);

        let audit = store.audit_entries().await;
        assert_eq!(audit.len(), 1);
        let details = audit[0].details.as_ref().unwrap();
        assert_eq!(details["archived_count"], 1);
        assert_eq!(details["archived_ids"], serde_json::json!([oldest]));
    }

    #[tokio::test]
    async fn test_for_tier_reads_matrix() {
        let event = DowngradeEvent::for_tier(
            OwnerId::new(),
            Some(PlanTier::Pro),
            PlanTier::Start,
            PermissionMatrix::standard(),
        );
        assert_eq!(event.new_limit, Limit::Count(10));
    }
}
