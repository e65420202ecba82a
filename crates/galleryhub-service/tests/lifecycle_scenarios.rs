//! End-to-end lifecycle and plan-quota scenarios against the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use galleryhub_core::AppError;
use galleryhub_core::error::ErrorKind;
use galleryhub_core::result::AppResult;
use galleryhub_core::traits::ManualClock;
use galleryhub_core::types::{GENERIC_FAILURE_MESSAGE, GalleryId, OwnerId, ServiceResponse};
use galleryhub_database::{
    ChangeOutcome, GalleryRename, GalleryStore, InsertOutcome, MemoryGalleryStore, SlugLookup,
    StatusChange,
};
use galleryhub_entity::audit::{CreateAuditLogEntry, actions};
use galleryhub_entity::gallery::{
    Gallery, GalleryStatus, LifecycleEvent, NewGallery, PurgedGallery, Transition,
};
use galleryhub_entity::plan::{Limit, PermissionMatrix, PlanTier};
use galleryhub_service::{
    CreateGallery, DowngradeEvent, DowngradeReconciler, LifecycleManager, QuotaGuard,
    RenameGallery, RequestContext, RetentionPurger, SlugGenerator,
};

struct Engine {
    store: Arc<MemoryGalleryStore>,
    clock: Arc<ManualClock>,
    manager: LifecycleManager,
    reconciler: DowngradeReconciler,
    purger: RetentionPurger,
}

fn day_zero() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap()
}

fn engine() -> Engine {
    let store = Arc::new(MemoryGalleryStore::new());
    let clock = Arc::new(ManualClock::new(day_zero()));
    let matrix = Arc::new(PermissionMatrix::standard().clone());

    let quota = QuotaGuard::new(store.clone(), matrix);
    let manager = LifecycleManager::new(
        store.clone(),
        quota,
        SlugGenerator::default(),
        clock.clone(),
    );
    let reconciler = DowngradeReconciler::new(store.clone(), clock.clone());
    let purger = RetentionPurger::new(store.clone(), store.clone(), clock.clone());

    Engine {
        store,
        clock,
        manager,
        reconciler,
        purger,
    }
}

fn owner(handle: &str, tier: PlanTier) -> RequestContext {
    RequestContext::new(OwnerId::new(), handle, tier)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn create(e: &Engine, ctx: &RequestContext, title: &str, event_date: NaiveDate) -> Gallery {
    e.manager
        .create(
            ctx,
            CreateGallery {
                title: title.to_string(),
                event_date,
                show_on_profile: true,
            },
        )
        .await
        .into_result()
        .unwrap()
}

async fn status_of(e: &Engine, id: GalleryId) -> Option<GalleryStatus> {
    e.store.get(id).await.map(|g| g.status)
}

// -- end-to-end flows ---------------------------------------------------------

#[tokio::test]
async fn free_owner_at_limit_cannot_create() {
    let e = engine();
    let ctx = owner("ana", PlanTier::Free);
    create(&e, &ctx, "Um", date(2026, 1, 1)).await;
    create(&e, &ctx, "Dois", date(2026, 1, 2)).await;

    let snapshot = e.manager.can_create(&ctx).await.into_result().unwrap();
    assert!(!snapshot.allowed);
    assert_eq!(snapshot.limit, Limit::Count(2));
    assert_eq!(snapshot.current_count, Some(2));
    let message = snapshot.message.unwrap();
    assert!(message.contains("Free") && message.contains('2'), "{message}");
}

#[tokio::test]
async fn create_builds_portuguese_slug() {
    let e = engine();
    let ctx = owner("hitalo", PlanTier::Start);
    let gallery = create(&e, &ctx, "Casamento José & Maria!", date(2026, 1, 1)).await;

    assert_eq!(gallery.slug, "hitalo/2026/01/01/casamento-jose-e-maria");
    assert_eq!(gallery.status, GalleryStatus::Active);
    assert_eq!(gallery.created_at, day_zero());
}

#[tokio::test]
async fn downgrade_from_pro_to_free_archives_oldest_excess() {
    let e = engine();
    let ctx = owner("bia", PlanTier::Pro);
    let archived_by_hand = create(&e, &ctx, "Arquivada", date(2026, 1, 5)).await;
    let oldest = create(&e, &ctx, "Antiga", date(2026, 1, 1)).await;
    let middle = create(&e, &ctx, "Meio", date(2026, 1, 2)).await;
    let newest = create(&e, &ctx, "Nova", date(2026, 1, 3)).await;

    e.manager
        .archive(&ctx, archived_by_hand.id)
        .await
        .into_result()
        .unwrap();

    let event = DowngradeEvent::for_tier(
        ctx.owner_id,
        Some(PlanTier::Pro),
        PlanTier::Free,
        PermissionMatrix::standard(),
    );
    assert_eq!(event.new_limit, Limit::Count(2));
    let report = e.reconciler.reconcile(&event).await.unwrap();

    assert_eq!(report.archived_count, 1);
    assert_eq!(report.archived_ids, vec![oldest.id]);
    assert_eq!(status_of(&e, oldest.id).await, Some(GalleryStatus::Archived));
    assert_eq!(status_of(&e, middle.id).await, Some(GalleryStatus::Active));
    assert_eq!(status_of(&e, newest.id).await, Some(GalleryStatus::Active));
    assert_eq!(
        e.store
            .count_by_status(ctx.owner_id, GalleryStatus::Active)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn trashed_gallery_purged_after_retention_window() {
    let e = engine();
    let ctx = owner("caio", PlanTier::Start);
    let gallery = create(&e, &ctx, "Batizado", date(2026, 1, 1)).await;
    e.manager.trash(&ctx, gallery.id).await.into_result().unwrap();

    e.clock.set(day_zero() + Duration::days(29));
    assert!(e.purger.sweep(30).await.unwrap().is_empty());
    assert_eq!(status_of(&e, gallery.id).await, Some(GalleryStatus::Trashed));

    e.clock.set(day_zero() + Duration::days(31));
    let purged = e.purger.sweep(30).await.unwrap();
    assert_eq!(
        purged,
        vec![PurgedGallery {
            id: gallery.id,
            owner_id: ctx.owner_id,
            slug: gallery.slug.clone(),
        }]
    );
    assert_eq!(status_of(&e, gallery.id).await, None);
}

#[tokio::test]
async fn restore_at_limit_is_rejected_and_stays_trashed() {
    let e = engine();
    let ctx = owner("duda", PlanTier::Free);
    let first = create(&e, &ctx, "Primeira", date(2026, 1, 1)).await;
    create(&e, &ctx, "Segunda", date(2026, 1, 2)).await;
    e.manager.trash(&ctx, first.id).await.into_result().unwrap();
    create(&e, &ctx, "Terceira", date(2026, 1, 3)).await;

    let resp = e.manager.restore(&ctx, first.id).await;
    assert!(!resp.success);
    let error = resp.error.unwrap();
    assert_eq!(error.code, ErrorKind::QuotaExceeded);
    assert!(error.message.contains("Free"), "{}", error.message);
    let details = error.details.unwrap();
    assert_eq!(details["limit"], 2);
    assert_eq!(details["current_count"], 2);

    assert_eq!(status_of(&e, first.id).await, Some(GalleryStatus::Trashed));
}

// -- properties ---------------------------------------------------------------

#[tokio::test]
async fn can_create_tracks_active_count_only() {
    let e = engine();
    let ctx = owner("eva", PlanTier::Free);

    let mut ids = Vec::new();
    for (n, title) in ["A", "B"].into_iter().enumerate() {
        let snapshot = e.manager.can_create(&ctx).await.into_result().unwrap();
        assert_eq!(snapshot.current_count, Some(n as u64));
        assert!(snapshot.allowed);
        ids.push(create(&e, &ctx, title, date(2026, 1, 1)).await.id);
    }
    assert!(!e.manager.can_create(&ctx).await.into_result().unwrap().allowed);

    // Archived and trashed galleries free their slot.
    e.manager.archive(&ctx, ids[0]).await.into_result().unwrap();
    assert!(e.manager.can_create(&ctx).await.into_result().unwrap().allowed);
    e.manager.trash(&ctx, ids[1]).await.into_result().unwrap();
    let snapshot = e.manager.can_create(&ctx).await.into_result().unwrap();
    assert_eq!(snapshot.current_count, Some(0));
}

#[tokio::test]
async fn can_reactivate_short_circuits_for_active() {
    let e = engine();
    let ctx = owner("flor", PlanTier::Free);
    let a = create(&e, &ctx, "A", date(2026, 1, 1)).await;
    create(&e, &ctx, "B", date(2026, 1, 2)).await;

    let snapshot = e.manager.can_reactivate(&ctx, a.id).await.into_result().unwrap();
    assert!(snapshot.allowed);
    assert_eq!(snapshot.current_count, None);

    e.manager.archive(&ctx, a.id).await.into_result().unwrap();
    create(&e, &ctx, "C", date(2026, 1, 3)).await;
    let snapshot = e.manager.can_reactivate(&ctx, a.id).await.into_result().unwrap();
    assert!(!snapshot.allowed);
    assert_eq!(snapshot.current_count, Some(2));

    let resp = e.manager.unarchive(&ctx, a.id).await;
    assert_eq!(resp.error_kind(), Some(ErrorKind::QuotaExceeded));
}

#[tokio::test]
async fn rename_with_same_title_keeps_slug() {
    let e = engine();
    let ctx = owner("gil", PlanTier::Start);
    let first = create(&e, &ctx, "Formatura", date(2026, 1, 1)).await;
    let second = create(&e, &ctx, "Formatura", date(2026, 1, 1)).await;
    assert_eq!(second.slug, "gil/2026/01/01/formatura-2");

    for gallery in [&first, &second] {
        let renamed = e
            .manager
            .rename(
                &ctx,
                gallery.id,
                RenameGallery {
                    title: gallery.title.clone(),
                    event_date: Some(gallery.event_date),
                },
            )
            .await
            .into_result()
            .unwrap();
        assert_eq!(renamed.slug, gallery.slug);
    }
}

#[tokio::test]
async fn colliding_titles_get_numbered_suffixes() {
    let e = engine();
    let ctx = owner("hugo", PlanTier::Plus);
    let mut created = Vec::new();
    for title in ["Festa Junina", "festa junina", "Festa  Junina!"] {
        created.push(create(&e, &ctx, title, date(2026, 6, 24)).await.slug);
    }
    assert_eq!(
        created,
        vec![
            "hugo/2026/06/24/festa-junina",
            "hugo/2026/06/24/festa-junina-2",
            "hugo/2026/06/24/festa-junina-3",
        ]
    );
}

#[tokio::test]
async fn only_table_transitions_are_reachable() {
    for start in GalleryStatus::ALL {
        for event in LifecycleEvent::ALL {
            let e = engine();
            let ctx = owner("ivo", PlanTier::Premium);

            let mut gallery = NewGallery {
                id: GalleryId::new(),
                owner_id: ctx.owner_id,
                slug: format!("ivo/{start}/{event}"),
                title: "x".into(),
                event_date: date(2026, 1, 1),
                show_on_profile: true,
                created_at: day_zero(),
            }
            .into_gallery();
            gallery.status = start;
            gallery.trashed_at = (start == GalleryStatus::Trashed).then_some(day_zero());
            let id = gallery.id;
            e.store.seed(gallery).await;

            let (success, kind) = match event {
                LifecycleEvent::Archive => outcome(e.manager.archive(&ctx, id).await),
                LifecycleEvent::Unarchive => outcome(e.manager.unarchive(&ctx, id).await),
                LifecycleEvent::Trash => outcome(e.manager.trash(&ctx, id).await),
                LifecycleEvent::Restore => outcome(e.manager.restore(&ctx, id).await),
                LifecycleEvent::Purge => outcome(e.manager.purge(&ctx, id).await),
            };

            match event.apply(start) {
                Some(Transition::To(target)) => {
                    assert!(success, "{event} from {start} should succeed");
                    assert_eq!(status_of(&e, id).await, Some(target));
                }
                Some(Transition::Purged) => {
                    assert!(success, "{event} from {start} should succeed");
                    assert_eq!(status_of(&e, id).await, None);
                }
                None => {
                    assert!(!success, "{event} from {start} should be rejected");
                    assert_eq!(kind, Some(ErrorKind::InvalidTransition));
                    assert_eq!(status_of(&e, id).await, Some(start));
                }
            }
        }
    }
}

fn outcome<T>(resp: ServiceResponse<T>) -> (bool, Option<ErrorKind>) {
    (resp.success, resp.error_kind())
}

#[tokio::test]
async fn downgrade_is_deterministic_and_idempotent() {
    let e = engine();
    let ctx = owner("juca", PlanTier::Pro);
    let mut by_day = Vec::new();
    for day in 1..=5 {
        by_day.push(create(&e, &ctx, &format!("Evento {day}"), date(2026, 2, day)).await);
    }

    let event = DowngradeEvent {
        owner_id: ctx.owner_id,
        old_tier: Some(PlanTier::Pro),
        new_tier: PlanTier::Start,
        new_limit: Limit::Count(3),
    };
    let report = e.reconciler.reconcile(&event).await.unwrap();
    assert_eq!(report.archived_count, 2);
    assert_eq!(report.archived_ids, vec![by_day[1].id, by_day[0].id]);
    for (i, gallery) in by_day.iter().enumerate() {
        let expected = if i < 2 {
            GalleryStatus::Archived
        } else {
            GalleryStatus::Active
        };
        assert_eq!(status_of(&e, gallery.id).await, Some(expected));
    }

    let rerun = e.reconciler.reconcile(&event).await.unwrap();
    assert_eq!(rerun.archived_count, 0);

    let audit = e.store.audit_entries().await;
    assert_eq!(audit.len(), 2);
    assert!(audit.iter().all(|a| a.action == actions::DOWNGRADE_RECONCILED));
    assert_eq!(audit[0].details.as_ref().unwrap()["archived_count"], 2);
    assert_eq!(audit[1].details.as_ref().unwrap()["archived_count"], 0);
}

#[tokio::test]
async fn downgrade_ties_break_by_id() {
    let e = engine();
    let ctx = owner("lia", PlanTier::Pro);
    let mut ids = Vec::new();
    for n in 0..4 {
        ids.push(create(&e, &ctx, &format!("Mesmo dia {n}"), date(2026, 3, 1)).await.id);
    }
    ids.sort();

    let report = e
        .reconciler
        .reconcile(&DowngradeEvent {
            owner_id: ctx.owner_id,
            old_tier: None,
            new_tier: PlanTier::Free,
            new_limit: Limit::Count(2),
        })
        .await
        .unwrap();
    assert_eq!(report.archived_ids, ids[2..].to_vec());
}

#[tokio::test]
async fn retention_boundary() {
    let e = engine();
    let ctx = owner("mel", PlanTier::Start);
    let expired = create(&e, &ctx, "Expirada", date(2026, 1, 1)).await;
    let kept = create(&e, &ctx, "Mantida", date(2026, 1, 2)).await;

    e.manager.trash(&ctx, expired.id).await.into_result().unwrap();
    e.clock.advance(Duration::days(1) + Duration::seconds(1));
    e.manager.trash(&ctx, kept.id).await.into_result().unwrap();

    // `expired` is now 30d+1s old; `kept` exactly 29d.
    e.clock.set(day_zero() + Duration::days(30) + Duration::seconds(1));
    let purged = e.purger.sweep(30).await.unwrap();

    assert_eq!(purged.len(), 1);
    assert_eq!(purged[0].id, expired.id);
    assert_eq!(status_of(&e, kept.id).await, Some(GalleryStatus::Trashed));
}

#[tokio::test]
async fn other_owners_galleries_look_missing() {
    let e = engine();
    let alice = owner("alice", PlanTier::Free);
    let bob = owner("bob", PlanTier::Free);
    let gallery = create(&e, &alice, "Privada", date(2026, 1, 1)).await;

    let foreign = e.manager.archive(&bob, gallery.id).await.error.unwrap();
    let missing = e.manager.archive(&bob, GalleryId::new()).await.error.unwrap();
    assert_eq!(foreign, missing);
    assert_eq!(foreign.code, ErrorKind::Authorization);

    let foreign_rename = e
        .manager
        .rename(
            &bob,
            gallery.id,
            RenameGallery {
                title: "Minha".into(),
                event_date: None,
            },
        )
        .await;
    assert_eq!(foreign_rename.error_kind(), Some(ErrorKind::Authorization));
    assert_eq!(
        e.manager.can_reactivate(&bob, gallery.id).await.error_kind(),
        Some(ErrorKind::Authorization)
    );

    assert_eq!(status_of(&e, gallery.id).await, Some(GalleryStatus::Active));
    let bob_quota = e.manager.can_create(&bob).await.into_result().unwrap();
    assert_eq!(bob_quota.current_count, Some(0));
    assert!(e.manager.list(&bob, None).await.into_result().unwrap().is_empty());
}

// -- store faults ---------------------------------------------------------------

/// Store whose every call fails, as if the database were unreachable.
#[derive(Debug)]
struct UnreachableStore;

fn unreachable<T>() -> AppResult<T> {
    Err(AppError::database("connection refused (os error 111)"))
}

#[async_trait]
impl SlugLookup for UnreachableStore {
    async fn slug_exists(&self, _: &str, _: Option<GalleryId>) -> AppResult<bool> {
        unreachable()
    }
}

#[async_trait]
impl GalleryStore for UnreachableStore {
    async fn find_owned(&self, _: OwnerId, _: GalleryId) -> AppResult<Option<Gallery>> {
        unreachable()
    }
    async fn list_by_owner(&self, _: OwnerId, _: Option<GalleryStatus>) -> AppResult<Vec<Gallery>> {
        unreachable()
    }
    async fn count_by_status(&self, _: OwnerId, _: GalleryStatus) -> AppResult<u64> {
        unreachable()
    }
    async fn insert_within_quota(&self, _: &NewGallery, _: Limit) -> AppResult<InsertOutcome> {
        unreachable()
    }
    async fn change_status(&self, _: &StatusChange) -> AppResult<ChangeOutcome> {
        unreachable()
    }
    async fn set_visibility(
        &self,
        _: OwnerId,
        _: GalleryId,
        _: bool,
        _: DateTime<Utc>,
    ) -> AppResult<Option<Gallery>> {
        unreachable()
    }
    async fn rename(&self, _: &GalleryRename) -> AppResult<ChangeOutcome> {
        unreachable()
    }
    async fn purge(&self, _: OwnerId, _: GalleryId) -> AppResult<ChangeOutcome> {
        unreachable()
    }
    async fn archive_many(
        &self,
        _: OwnerId,
        _: &[GalleryId],
        _: DateTime<Utc>,
        _: &(dyn for<'g> Fn(&'g [GalleryId]) -> CreateAuditLogEntry + Send + Sync),
    ) -> AppResult<Vec<GalleryId>> {
        unreachable()
    }
    async fn find_trashed_before(&self, _: DateTime<Utc>) -> AppResult<Vec<Gallery>> {
        unreachable()
    }
    async fn purge_many(&self, _: &[GalleryId], _: DateTime<Utc>) -> AppResult<Vec<PurgedGallery>> {
        unreachable()
    }
}

#[tokio::test]
async fn store_failures_are_masked_and_batches_fail_whole() {
    let store: Arc<dyn GalleryStore> = Arc::new(UnreachableStore);
    let audit = Arc::new(MemoryGalleryStore::new());
    let clock = Arc::new(ManualClock::new(day_zero()));
    let quota = QuotaGuard::new(store.clone(), Arc::new(PermissionMatrix::standard().clone()));
    let manager = LifecycleManager::new(store.clone(), quota, SlugGenerator::default(), clock.clone());

    let ctx = owner("nina", PlanTier::Free);
    let resp = manager
        .create(
            &ctx,
            CreateGallery {
                title: "Qualquer".into(),
                event_date: date(2026, 1, 1),
                show_on_profile: true,
            },
        )
        .await;
    let error = resp.error.unwrap();
    assert_eq!(error.code, ErrorKind::Database);
    assert_eq!(error.message, GENERIC_FAILURE_MESSAGE);

    let purger = RetentionPurger::new(store.clone(), audit.clone(), clock.clone());
    assert_eq!(purger.sweep(30).await.unwrap_err().kind, ErrorKind::Database);

    let reconciler = DowngradeReconciler::new(store, clock);
    let err = reconciler
        .reconcile(&DowngradeEvent {
            owner_id: ctx.owner_id,
            old_tier: None,
            new_tier: PlanTier::Free,
            new_limit: Limit::Count(2),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);
    assert!(audit.audit_entries().await.is_empty());
}
