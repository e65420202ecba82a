//! In-memory gallery store using a Tokio mutex.
//!
//! Every method runs under one lock, which gives the same
//! count-then-write atomicity the PostgreSQL repository gets from a
//! serializable transaction. Suitable for single-node deployments and
//! tests only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use galleryhub_core::error::AppError;
use galleryhub_core::result::AppResult;
use galleryhub_core::types::{AuditLogId, GalleryId, OwnerId};
use galleryhub_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use galleryhub_entity::gallery::{Gallery, GalleryStatus, NewGallery, PurgedGallery};
use galleryhub_entity::plan::Limit;

use crate::store::{
    AuditRecorder, ChangeOutcome, GalleryRename, GalleryStore, InsertOutcome, SlugLookup,
    StatusChange,
};

#[derive(Debug, Default)]
struct InnerState {
    galleries: HashMap<GalleryId, Gallery>,
    audit: Vec<AuditLogEntry>,
    audit_offline: bool,
}

impl InnerState {
    fn append_audit(&mut self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        if self.audit_offline {
            return Err(AppError::database("Audit log is unavailable"));
        }
        let row = AuditLogEntry {
            id: AuditLogId::new(),
            owner_id: entry.owner_id,
            action: entry.action,
            target_type: entry.target_type,
            target_id: entry.target_id,
            details: entry.details,
            created_at: entry.created_at,
        };
        self.audit.push(row.clone());
        Ok(row)
    }

    fn count(&self, owner_id: OwnerId, status: GalleryStatus) -> u64 {
        self.galleries
            .values()
            .filter(|g| g.owner_id == owner_id && g.status == status)
            .count() as u64
    }

    fn slug_taken(&self, slug: &str, exclude: Option<GalleryId>) -> bool {
        self.galleries
            .values()
            .any(|g| g.slug == slug && Some(g.id) != exclude)
    }

    fn owned_mut(&mut self, owner_id: OwnerId, id: GalleryId) -> Option<&mut Gallery> {
        self.galleries
            .get_mut(&id)
            .filter(|g| g.owner_id == owner_id)
    }
}

fn slug_conflict() -> AppError {
    AppError::conflict("Gallery slug is already taken")
}

/// Gallery and audit store held entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryGalleryStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryGalleryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row as-is, bypassing quota and slug checks.
    ///
    /// Used to seed fixtures in any lifecycle state.
    pub async fn seed(&self, gallery: Gallery) {
        let mut state = self.state.lock().await;
        state.galleries.insert(gallery.id, gallery);
    }

    /// Fetch a gallery regardless of owner.
    pub async fn get(&self, id: GalleryId) -> Option<Gallery> {
        self.state.lock().await.galleries.get(&id).cloned()
    }

    /// Every audit entry recorded so far, oldest first.
    pub async fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.state.lock().await.audit.clone()
    }

    /// Make every audit write fail until switched back, as when the audit
    /// table is unreachable.
    pub async fn set_audit_offline(&self, offline: bool) {
        self.state.lock().await.audit_offline = offline;
    }

    /// Total number of gallery rows.
    pub async fn len(&self) -> usize {
        self.state.lock().await.galleries.len()
    }

    /// Whether the store has no gallery rows.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SlugLookup for MemoryGalleryStore {
    async fn slug_exists(&self, slug: &str, exclude: Option<GalleryId>) -> AppResult<bool> {
        Ok(self.state.lock().await.slug_taken(slug, exclude))
    }
}

#[async_trait]
impl GalleryStore for MemoryGalleryStore {
    async fn find_owned(&self, owner_id: OwnerId, id: GalleryId) -> AppResult<Option<Gallery>> {
        let state = self.state.lock().await;
        Ok(state
            .galleries
            .get(&id)
            .filter(|g| g.owner_id == owner_id)
            .cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: OwnerId,
        status: Option<GalleryStatus>,
    ) -> AppResult<Vec<Gallery>> {
        let state = self.state.lock().await;
        let mut galleries: Vec<Gallery> = state
            .galleries
            .values()
            .filter(|g| g.owner_id == owner_id && status.is_none_or(|s| g.status == s))
            .cloned()
            .collect();
        galleries.sort_by(|a, b| b.event_date.cmp(&a.event_date).then(a.id.cmp(&b.id)));
        Ok(galleries)
    }

    async fn count_by_status(&self, owner_id: OwnerId, status: GalleryStatus) -> AppResult<u64> {
        Ok(self.state.lock().await.count(owner_id, status))
    }

    async fn insert_within_quota(
        &self,
        gallery: &NewGallery,
        limit: Limit,
    ) -> AppResult<InsertOutcome> {
        let mut state = self.state.lock().await;

        let current = state.count(gallery.owner_id, GalleryStatus::Active);
        if !limit.allows(current) {
            return Ok(InsertOutcome::QuotaExceeded { current });
        }
        if state.slug_taken(&gallery.slug, None) {
            return Err(slug_conflict());
        }

        let row = gallery.clone().into_gallery();
        state.galleries.insert(row.id, row.clone());
        debug!(gallery_id = %row.id, slug = %row.slug, "Gallery inserted");
        Ok(InsertOutcome::Inserted(row))
    }

    async fn change_status(&self, change: &StatusChange) -> AppResult<ChangeOutcome> {
        let mut state = self.state.lock().await;

        match state.owned_mut(change.owner_id, change.gallery_id) {
            None => return Ok(ChangeOutcome::NotFound),
            Some(g) if g.status != change.from => {
                return Ok(ChangeOutcome::StateChanged(g.status));
            }
            Some(_) => {}
        }

        if let (GalleryStatus::Active, Some(limit)) = (change.to, change.active_limit) {
            let active = state.count(change.owner_id, GalleryStatus::Active);
            if !limit.allows(active) {
                return Ok(ChangeOutcome::QuotaExceeded { current: active });
            }
        }

        let Some(gallery) = state.owned_mut(change.owner_id, change.gallery_id) else {
            return Ok(ChangeOutcome::NotFound);
        };
        gallery.status = change.to;
        gallery.trashed_at = (change.to == GalleryStatus::Trashed).then_some(change.at);
        gallery.updated_at = change.at;
        Ok(ChangeOutcome::Applied(gallery.clone()))
    }

    async fn set_visibility(
        &self,
        owner_id: OwnerId,
        id: GalleryId,
        show_on_profile: bool,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Gallery>> {
        let mut state = self.state.lock().await;
        Ok(state.owned_mut(owner_id, id).map(|gallery| {
            gallery.show_on_profile = show_on_profile;
            gallery.updated_at = at;
            gallery.clone()
        }))
    }

    async fn rename(&self, rename: &GalleryRename) -> AppResult<ChangeOutcome> {
        let mut state = self.state.lock().await;

        if state.slug_taken(&rename.slug, Some(rename.gallery_id)) {
            return Err(slug_conflict());
        }

        let Some(gallery) = state.owned_mut(rename.owner_id, rename.gallery_id) else {
            return Ok(ChangeOutcome::NotFound);
        };
        if gallery.status != GalleryStatus::Active {
            return Ok(ChangeOutcome::StateChanged(gallery.status));
        }

        gallery.title = rename.title.clone();
        gallery.event_date = rename.event_date;
        gallery.slug = rename.slug.clone();
        gallery.updated_at = rename.at;
        Ok(ChangeOutcome::Applied(gallery.clone()))
    }

    async fn purge(&self, owner_id: OwnerId, id: GalleryId) -> AppResult<ChangeOutcome> {
        let mut state = self.state.lock().await;

        match state.owned_mut(owner_id, id).map(|g| g.status) {
            None => Ok(ChangeOutcome::NotFound),
            Some(GalleryStatus::Trashed) => Ok(state
                .galleries
                .remove(&id)
                .map_or(ChangeOutcome::NotFound, ChangeOutcome::Applied)),
            Some(status) => Ok(ChangeOutcome::StateChanged(status)),
        }
    }

    async fn archive_many(
        &self,
        owner_id: OwnerId,
        ids: &[GalleryId],
        at: DateTime<Utc>,
        audit: &(dyn for<'g> Fn(&'g [GalleryId]) -> CreateAuditLogEntry + Send + Sync),
    ) -> AppResult<Vec<GalleryId>> {
        let mut state = self.state.lock().await;

        let archivable: Vec<GalleryId> = ids
            .iter()
            .copied()
            .filter(|id| {
                state
                    .galleries
                    .get(id)
                    .is_some_and(|g| g.owner_id == owner_id && g.status == GalleryStatus::Active)
            })
            .collect();

        // Audit first: a refused entry leaves every gallery untouched.
        state.append_audit(audit(&archivable))?;

        for id in &archivable {
            if let Some(gallery) = state.galleries.get_mut(id) {
                gallery.status = GalleryStatus::Archived;
                gallery.updated_at = at;
            }
        }
        Ok(archivable)
    }

    async fn find_trashed_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Gallery>> {
        let state = self.state.lock().await;
        let mut expired: Vec<Gallery> = state
            .galleries
            .values()
            .filter(|g| g.trashed_before(cutoff))
            .cloned()
            .collect();
        expired.sort_by(|a, b| a.trashed_at.cmp(&b.trashed_at).then(a.id.cmp(&b.id)));
        Ok(expired)
    }

    async fn purge_many(
        &self,
        ids: &[GalleryId],
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<PurgedGallery>> {
        let mut state = self.state.lock().await;

        let doomed: Vec<GalleryId> = ids
            .iter()
            .copied()
            .filter(|id| {
                state
                    .galleries
                    .get(id)
                    .is_some_and(|g| g.trashed_before(cutoff))
            })
            .collect();

        Ok(doomed
            .into_iter()
            .filter_map(|id| state.galleries.remove(&id))
            .map(|g| g.purged_summary())
            .collect())
    }
}

#[async_trait]
impl AuditRecorder for MemoryGalleryStore {
    async fn record(&self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        self.state.lock().await.append_audit(entry)
    }

    async fn entries_for_owner(
        &self,
        owner_id: OwnerId,
        action: Option<&str>,
    ) -> AppResult<Vec<AuditLogEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .audit
            .iter()
            .rev()
            .filter(|e| e.owner_id == owner_id && action.is_none_or(|a| e.action == a))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn new_gallery(owner_id: OwnerId, slug: &str, day: u32) -> NewGallery {
        NewGallery {
            id: GalleryId::new(),
            owner_id,
            slug: slug.to_string(),
            title: slug.to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            show_on_profile: true,
            created_at: now(),
        }
    }

    async fn insert(store: &MemoryGalleryStore, gallery: NewGallery) -> Gallery {
        match store
            .insert_within_quota(&gallery, Limit::Unlimited)
            .await
            .unwrap()
        {
            InsertOutcome::Inserted(g) => g,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insert_respects_limit() {
        let store = MemoryGalleryStore::new();
        let owner = OwnerId::new();

        let first = new_gallery(owner, "a/2026/01/01/one", 1);
        assert!(matches!(
            store.insert_within_quota(&first, Limit::Count(1)).await.unwrap(),
            InsertOutcome::Inserted(_)
        ));

        let second = new_gallery(owner, "a/2026/01/02/two", 2);
        assert_eq!(
            store.insert_within_quota(&second, Limit::Count(1)).await.unwrap(),
            InsertOutcome::QuotaExceeded { current: 1 }
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_slug() {
        let store = MemoryGalleryStore::new();
        insert(&store, new_gallery(OwnerId::new(), "a/2026/01/01/x", 1)).await;

        let err = store
            .insert_within_quota(
                &new_gallery(OwnerId::new(), "a/2026/01/01/x", 1),
                Limit::Unlimited,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, galleryhub_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_change_status_is_owner_scoped() {
        let store = MemoryGalleryStore::new();
        let owner = OwnerId::new();
        let gallery = insert(&store, new_gallery(owner, "a/2026/01/01/x", 1)).await;

        let foreign = StatusChange {
            owner_id: OwnerId::new(),
            gallery_id: gallery.id,
            from: GalleryStatus::Active,
            to: GalleryStatus::Trashed,
            active_limit: None,
            at: now(),
        };
        assert_eq!(
            store.change_status(&foreign).await.unwrap(),
            ChangeOutcome::NotFound
        );

        let own = StatusChange {
            owner_id: owner,
            ..foreign
        };
        let ChangeOutcome::Applied(trashed) = store.change_status(&own).await.unwrap() else {
            panic!("expected applied");
        };
        assert_eq!(trashed.trashed_at, Some(now()));

        // Replaying with a stale `from` is refused.
        assert_eq!(
            store.change_status(&own).await.unwrap(),
            ChangeOutcome::StateChanged(GalleryStatus::Trashed)
        );
    }

    #[tokio::test]
    async fn test_list_orders_by_event_date_then_id() {
        let store = MemoryGalleryStore::new();
        let owner = OwnerId::new();
        let older = insert(&store, new_gallery(owner, "a/old", 1)).await;
        let newer = insert(&store, new_gallery(owner, "a/new", 9)).await;
        let tie = insert(&store, new_gallery(owner, "a/tie", 9)).await;
        insert(&store, new_gallery(OwnerId::new(), "b/other", 5)).await;

        let ids: Vec<_> = store
            .list_by_owner(owner, None)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        let (first, second) = if newer.id < tie.id {
            (newer.id, tie.id)
        } else {
            (tie.id, newer.id)
        };
        assert_eq!(ids, vec![first, second, older.id]);
    }

    #[tokio::test]
    async fn test_purge_many_skips_recently_trashed() {
        let store = MemoryGalleryStore::new();
        let owner = OwnerId::new();
        let gallery = insert(&store, new_gallery(owner, "a/x", 1)).await;
        store
            .change_status(&StatusChange {
                owner_id: owner,
                gallery_id: gallery.id,
                from: GalleryStatus::Active,
                to: GalleryStatus::Trashed,
                active_limit: None,
                at: now(),
            })
            .await
            .unwrap();

        assert!(store.purge_many(&[gallery.id], now()).await.unwrap().is_empty());

        let purged = store
            .purge_many(&[gallery.id], now() + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(purged, vec![gallery.purged_summary()]);
        assert!(store.is_empty().await);
    }

    fn reconciled(owner_id: OwnerId) -> impl Fn(&[GalleryId]) -> CreateAuditLogEntry + Send + Sync {
        move |archived| CreateAuditLogEntry {
            owner_id,
            action: "plan.downgrade_reconciled".to_string(),
            target_type: "owner".to_string(),
            target_id: None,
            details: Some(serde_json::json!({ "archived_count": archived.len() })),
            created_at: now(),
        }
    }

    #[tokio::test]
    async fn test_archive_many_skips_foreign_and_inactive() {
        let store = MemoryGalleryStore::new();
        let owner = OwnerId::new();
        let mine = insert(&store, new_gallery(owner, "a/mine", 1)).await;
        let theirs = insert(&store, new_gallery(OwnerId::new(), "b/theirs", 1)).await;

        let archived = store
            .archive_many(owner, &[theirs.id, mine.id], now(), &reconciled(owner))
            .await
            .unwrap();
        assert_eq!(archived, vec![mine.id]);
        assert_eq!(store.get(theirs.id).await.unwrap().status, GalleryStatus::Active);

        let again = store
            .archive_many(owner, &[mine.id], now(), &reconciled(owner))
            .await
            .unwrap();
        assert!(again.is_empty());

        let audit = store.audit_entries().await;
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].details.as_ref().unwrap()["archived_count"], 1);
        assert_eq!(audit[1].details.as_ref().unwrap()["archived_count"], 0);
    }

    #[tokio::test]
    async fn test_archive_many_is_undone_when_audit_fails() {
        let store = MemoryGalleryStore::new();
        let owner = OwnerId::new();
        let gallery = insert(&store, new_gallery(owner, "a/x", 1)).await;

        store.set_audit_offline(true).await;
        let err = store
            .archive_many(owner, &[gallery.id], now(), &reconciled(owner))
            .await
            .unwrap_err();
        assert_eq!(err.kind, galleryhub_core::error::ErrorKind::Database);
        assert_eq!(store.get(gallery.id).await.unwrap().status, GalleryStatus::Active);
        assert!(store.audit_entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_audit_entries_filter_by_action() {
        let store = MemoryGalleryStore::new();
        let owner = OwnerId::new();
        for action in ["plan.downgrade_reconciled", "gallery.retention_purged"] {
            store
                .record(CreateAuditLogEntry {
                    owner_id: owner,
                    action: action.to_string(),
                    target_type: "owner".to_string(),
                    target_id: None,
                    details: None,
                    created_at: now(),
                })
                .await
                .unwrap();
        }

        let entries = store
            .entries_for_owner(owner, Some("plan.downgrade_reconciled"))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.audit_entries().await.len(), 2);
    }
}
