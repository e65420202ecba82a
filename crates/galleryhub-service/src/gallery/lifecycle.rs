//! Owner-facing gallery lifecycle operations.
//!
//! ```text
//! Active             ──archive──▶   Archived
//! Archived           ──unarchive──▶ Active     (quota)
//! Active | Archived  ──trash──▶     Trashed
//! Trashed            ──restore──▶   Active     (quota)
//! Trashed            ──purge──▶     (row deleted)
//! ```
//!
//! Every operation returns a [`ServiceResponse`]. Policy refusals (quota,
//! invalid transition, editing a non-Active gallery) and access denials
//! are carried in the envelope; only store faults are logged as errors.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use galleryhub_core::error::AppError;
use galleryhub_core::result::AppResult;
use galleryhub_core::traits::Clock;
use galleryhub_core::types::{GalleryId, OwnerId, ServiceResponse};
use galleryhub_database::{
    ChangeOutcome, GalleryRename, GalleryStore, InsertOutcome, StatusChange,
};
use galleryhub_entity::gallery::{
    Gallery, GalleryStatus, LifecycleEvent, NewGallery, PurgedGallery, Transition,
};

use crate::context::RequestContext;
use crate::plan::quota::{QuotaGuard, QuotaSnapshot};

use super::slug::SlugGenerator;

/// Message for both "no such gallery" and "not yours".
pub const ACCESS_DENIED_MESSAGE: &str = "Gallery not found or access denied";

/// Longest accepted gallery title, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Build the single outcome for missing and foreign galleries.
pub(crate) fn access_denied(owner_id: OwnerId, gallery_id: GalleryId) -> AppError {
    info!(
        owner_id = %owner_id,
        gallery_id = %gallery_id,
        "Gallery access denied"
    );
    AppError::authorization(ACCESS_DENIED_MESSAGE)
}

/// Request to create a gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGallery {
    pub title: String,
    pub event_date: NaiveDate,
    /// Defaults to listed on the profile.
    #[serde(default = "default_show_on_profile")]
    pub show_on_profile: bool,
}

fn default_show_on_profile() -> bool {
    true
}

/// Request to change a gallery's title and, optionally, its date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameGallery {
    pub title: String,
    /// Keep the current date when absent.
    pub event_date: Option<NaiveDate>,
}

/// Gallery state machine with ownership and quota enforcement.
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    store: Arc<dyn GalleryStore>,
    quota: QuotaGuard,
    slugs: SlugGenerator,
    clock: Arc<dyn Clock>,
}

impl LifecycleManager {
    /// Creates a new lifecycle manager.
    pub fn new(
        store: Arc<dyn GalleryStore>,
        quota: QuotaGuard,
        slugs: SlugGenerator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            quota,
            slugs,
            clock,
        }
    }

    /// Pre-flight: may the caller create another gallery?
    pub async fn can_create(&self, ctx: &RequestContext) -> ServiceResponse<QuotaSnapshot> {
        self.quota.can_create(ctx.owner_id, ctx.tier).await.into()
    }

    /// Pre-flight: may the caller unarchive or restore this gallery?
    pub async fn can_reactivate(
        &self,
        ctx: &RequestContext,
        gallery_id: GalleryId,
    ) -> ServiceResponse<QuotaSnapshot> {
        self.quota
            .can_reactivate(ctx.owner_id, ctx.tier, gallery_id)
            .await
            .into()
    }

    /// Create a new Active gallery.
    ///
    /// The quota is checked before a slug is generated; a refusal leaves
    /// no trace in the store.
    pub async fn create(&self, ctx: &RequestContext, req: CreateGallery) -> ServiceResponse<Gallery> {
        self.try_create(ctx, req).await.into()
    }

    /// Change title and date of an Active gallery, regenerating its slug.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        gallery_id: GalleryId,
        req: RenameGallery,
    ) -> ServiceResponse<Gallery> {
        self.try_rename(ctx, gallery_id, req).await.into()
    }

    /// Active → Archived.
    pub async fn archive(&self, ctx: &RequestContext, id: GalleryId) -> ServiceResponse<Gallery> {
        self.move_to(ctx, id, LifecycleEvent::Archive).await.into()
    }

    /// Archived → Active, subject to quota.
    pub async fn unarchive(&self, ctx: &RequestContext, id: GalleryId) -> ServiceResponse<Gallery> {
        self.move_to(ctx, id, LifecycleEvent::Unarchive).await.into()
    }

    /// Active or Archived → Trashed.
    pub async fn trash(&self, ctx: &RequestContext, id: GalleryId) -> ServiceResponse<Gallery> {
        self.move_to(ctx, id, LifecycleEvent::Trash).await.into()
    }

    /// Trashed → Active, subject to quota. Never returns to Archived.
    pub async fn restore(&self, ctx: &RequestContext, id: GalleryId) -> ServiceResponse<Gallery> {
        self.move_to(ctx, id, LifecycleEvent::Restore).await.into()
    }

    /// Permanently delete a Trashed gallery.
    pub async fn purge(
        &self,
        ctx: &RequestContext,
        id: GalleryId,
    ) -> ServiceResponse<PurgedGallery> {
        self.try_purge(ctx, id).await.into()
    }

    /// Set whether the gallery is listed on the owner's profile.
    pub async fn set_visibility(
        &self,
        ctx: &RequestContext,
        id: GalleryId,
        show_on_profile: bool,
    ) -> ServiceResponse<Gallery> {
        self.try_set_visibility(ctx, id, Some(show_on_profile))
            .await
            .into()
    }

    /// Flip the show-on-profile flag.
    pub async fn toggle_visibility(
        &self,
        ctx: &RequestContext,
        id: GalleryId,
    ) -> ServiceResponse<Gallery> {
        self.try_set_visibility(ctx, id, None).await.into()
    }

    /// The caller's galleries, newest event first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        status: Option<GalleryStatus>,
    ) -> ServiceResponse<Vec<Gallery>> {
        self.store.list_by_owner(ctx.owner_id, status).await.into()
    }

    async fn try_create(&self, ctx: &RequestContext, req: CreateGallery) -> AppResult<Gallery> {
        let title = validate_title(&req.title)?;

        let snapshot = self.quota.can_create(ctx.owner_id, ctx.tier).await?;
        if !snapshot.allowed {
            return Err(snapshot.into_error());
        }

        let slug = self
            .slugs
            .generate(
                self.store.as_ref(),
                &ctx.owner_handle,
                &title,
                req.event_date,
                None,
            )
            .await;

        let new_gallery = NewGallery {
            id: GalleryId::new(),
            owner_id: ctx.owner_id,
            slug,
            title,
            event_date: req.event_date,
            show_on_profile: req.show_on_profile,
            created_at: self.clock.now(),
        };

        match self
            .store
            .insert_within_quota(&new_gallery, snapshot.limit)
            .await?
        {
            InsertOutcome::Inserted(gallery) => {
                info!(
                    owner_id = %ctx.owner_id,
                    gallery_id = %gallery.id,
                    slug = %gallery.slug,
                    "Gallery created"
                );
                Ok(gallery)
            }
            // Another request took the last slot between the check and the insert.
            InsertOutcome::QuotaExceeded { current } => {
                Err(self.quota.evaluate(ctx.tier, current).into_error())
            }
        }
    }

    async fn try_rename(
        &self,
        ctx: &RequestContext,
        gallery_id: GalleryId,
        req: RenameGallery,
    ) -> AppResult<Gallery> {
        let title = validate_title(&req.title)?;
        let gallery = self.load_owned(ctx, gallery_id).await?;

        if gallery.status != GalleryStatus::Active {
            return Err(not_editable(gallery.status));
        }

        let event_date = req.event_date.unwrap_or(gallery.event_date);
        let slug = self
            .slugs
            .generate(
                self.store.as_ref(),
                &ctx.owner_handle,
                &title,
                event_date,
                Some(gallery.id),
            )
            .await;

        let rename = GalleryRename {
            owner_id: ctx.owner_id,
            gallery_id,
            title,
            event_date,
            slug,
            at: self.clock.now(),
        };

        match self.store.rename(&rename).await? {
            ChangeOutcome::Applied(renamed) => {
                info!(
                    owner_id = %ctx.owner_id,
                    gallery_id = %gallery_id,
                    slug = %renamed.slug,
                    "Gallery renamed"
                );
                Ok(renamed)
            }
            ChangeOutcome::NotFound => Err(access_denied(ctx.owner_id, gallery_id)),
            ChangeOutcome::StateChanged(status) => Err(not_editable(status)),
            ChangeOutcome::QuotaExceeded { .. } => {
                Err(AppError::internal("Rename unexpectedly reported a quota refusal"))
            }
        }
    }

    /// Apply a status-changing event after ownership, table and quota checks.
    async fn move_to(
        &self,
        ctx: &RequestContext,
        gallery_id: GalleryId,
        event: LifecycleEvent,
    ) -> AppResult<Gallery> {
        let gallery = self.load_owned(ctx, gallery_id).await?;

        let target = match event.apply(gallery.status) {
            Some(Transition::To(target)) => target,
            Some(Transition::Purged) | None => {
                return Err(invalid_transition(event, gallery.status));
            }
        };

        let mut snapshot = None;
        if event.consumes_quota() {
            let check = self.quota.check_reactivate(&gallery, ctx.tier).await?;
            if !check.allowed {
                return Err(check.into_error());
            }
            snapshot = Some(check);
        }

        let change = StatusChange {
            owner_id: ctx.owner_id,
            gallery_id,
            from: gallery.status,
            to: target,
            active_limit: snapshot.as_ref().map(|s| s.limit),
            at: self.clock.now(),
        };

        match self.store.change_status(&change).await? {
            ChangeOutcome::Applied(updated) => {
                info!(
                    owner_id = %ctx.owner_id,
                    gallery_id = %gallery_id,
                    event = %event,
                    from = %gallery.status,
                    to = %updated.status,
                    "Gallery lifecycle transition"
                );
                Ok(updated)
            }
            ChangeOutcome::NotFound => Err(access_denied(ctx.owner_id, gallery_id)),
            ChangeOutcome::StateChanged(now) => Err(invalid_transition(event, now)),
            ChangeOutcome::QuotaExceeded { current } => {
                Err(self.quota.evaluate(ctx.tier, current).into_error())
            }
        }
    }

    async fn try_purge(&self, ctx: &RequestContext, gallery_id: GalleryId) -> AppResult<PurgedGallery> {
        let gallery = self.load_owned(ctx, gallery_id).await?;

        if LifecycleEvent::Purge.apply(gallery.status) != Some(Transition::Purged) {
            return Err(invalid_transition(LifecycleEvent::Purge, gallery.status));
        }

        match self.store.purge(ctx.owner_id, gallery_id).await? {
            ChangeOutcome::Applied(deleted) => {
                info!(
                    owner_id = %ctx.owner_id,
                    gallery_id = %gallery_id,
                    slug = %deleted.slug,
                    "Gallery purged"
                );
                Ok(deleted.purged_summary())
            }
            ChangeOutcome::NotFound => Err(access_denied(ctx.owner_id, gallery_id)),
            ChangeOutcome::StateChanged(now) => {
                Err(invalid_transition(LifecycleEvent::Purge, now))
            }
            ChangeOutcome::QuotaExceeded { .. } => {
                Err(AppError::internal("Purge unexpectedly reported a quota refusal"))
            }
        }
    }

    async fn try_set_visibility(
        &self,
        ctx: &RequestContext,
        gallery_id: GalleryId,
        show_on_profile: Option<bool>,
    ) -> AppResult<Gallery> {
        let show = match show_on_profile {
            Some(show) => show,
            None => !self.load_owned(ctx, gallery_id).await?.show_on_profile,
        };

        let updated = self
            .store
            .set_visibility(ctx.owner_id, gallery_id, show, self.clock.now())
            .await?
            .ok_or_else(|| access_denied(ctx.owner_id, gallery_id))?;

        debug!(
            owner_id = %ctx.owner_id,
            gallery_id = %gallery_id,
            show_on_profile = show,
            "Gallery visibility updated"
        );
        Ok(updated)
    }

    async fn load_owned(&self, ctx: &RequestContext, gallery_id: GalleryId) -> AppResult<Gallery> {
        self.store
            .find_owned(ctx.owner_id, gallery_id)
            .await?
            .ok_or_else(|| access_denied(ctx.owner_id, gallery_id))
    }
}

fn validate_title(raw: &str) -> AppResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::validation("Gallery title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(format!(
            "Gallery title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn invalid_transition(event: LifecycleEvent, from: GalleryStatus) -> AppError {
    debug!(event = %event, from = %from, "Rejected lifecycle transition");
    let allowed: Vec<&str> = event.allowed_from().iter().map(|s| s.as_str()).collect();
    AppError::invalid_transition(format!("Cannot {event} a gallery that is {from}"))
        .with_details(serde_json::json!({
            "event": event,
            "status": from,
            "allowed_from": allowed,
        }))
}

fn not_editable(status: GalleryStatus) -> AppError {
    debug!(status = %status, "Rejected edit of non-active gallery");
    AppError::policy(format!(
        "Only active galleries can be edited; this gallery is {status}. \
         Unarchive or restore it first."
    ))
    .with_details(serde_json::json!({ "status": status }))
}
