//! Storage contracts the lifecycle engine is written against.
//!
//! Every mutating method is a single unit of work. Methods that move a
//! gallery into the Active set take the caller's limit and re-check it
//! inside the same transaction (or critical section) as the write, so two
//! concurrent creates cannot both slip under the quota.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use galleryhub_core::result::AppResult;
use galleryhub_core::types::{GalleryId, OwnerId};
use galleryhub_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use galleryhub_entity::gallery::{Gallery, GalleryStatus, NewGallery, PurgedGallery};
use galleryhub_entity::plan::Limit;

/// Slug uniqueness check.
#[async_trait]
pub trait SlugLookup: Send + Sync {
    /// Whether `slug` belongs to any gallery other than `exclude`.
    async fn slug_exists(&self, slug: &str, exclude: Option<GalleryId>) -> AppResult<bool>;
}

/// A requested status change on one gallery.
#[derive(Debug, Clone, Copy)]
pub struct StatusChange {
    pub owner_id: OwnerId,
    pub gallery_id: GalleryId,
    /// The state the caller observed; the change is refused if it moved.
    pub from: GalleryStatus,
    pub to: GalleryStatus,
    /// Quota to re-check when `to` is Active. `None` skips the check.
    pub active_limit: Option<Limit>,
    /// Engine clock reading; stamps `updated_at` and `trashed_at`.
    pub at: DateTime<Utc>,
}

/// New title/date/slug for an Active gallery.
#[derive(Debug, Clone)]
pub struct GalleryRename {
    pub owner_id: OwnerId,
    pub gallery_id: GalleryId,
    pub title: String,
    pub event_date: NaiveDate,
    pub slug: String,
    pub at: DateTime<Utc>,
}

/// Result of [`GalleryStore::insert_within_quota`].
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(Gallery),
    /// The owner already holds `current` Active galleries.
    QuotaExceeded { current: u64 },
}

/// Result of a guarded single-gallery write.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeOutcome {
    /// The write happened; carries the row after it (or the deleted row).
    Applied(Gallery),
    /// No gallery with that id belongs to the owner.
    NotFound,
    /// The gallery is no longer in the expected state.
    StateChanged(GalleryStatus),
    /// Entering Active would exceed the limit.
    QuotaExceeded { current: u64 },
}

/// Gallery persistence.
#[async_trait]
pub trait GalleryStore: SlugLookup + Debug {
    /// Fetch a gallery only if `owner_id` owns it.
    async fn find_owned(&self, owner_id: OwnerId, id: GalleryId) -> AppResult<Option<Gallery>>;

    /// The owner's galleries, most recent event first, ties by id.
    async fn list_by_owner(
        &self,
        owner_id: OwnerId,
        status: Option<GalleryStatus>,
    ) -> AppResult<Vec<Gallery>>;

    /// Number of the owner's galleries in `status`.
    async fn count_by_status(&self, owner_id: OwnerId, status: GalleryStatus) -> AppResult<u64>;

    /// Count the owner's Active galleries and insert `gallery` only if
    /// `limit` still allows one more.
    async fn insert_within_quota(&self, gallery: &NewGallery, limit: Limit)
    -> AppResult<InsertOutcome>;

    /// Move one gallery between live states.
    ///
    /// `trashed_at` is set to `change.at` when entering Trashed and cleared
    /// otherwise.
    async fn change_status(&self, change: &StatusChange) -> AppResult<ChangeOutcome>;

    /// Set the show-on-profile flag, in any live state.
    async fn set_visibility(
        &self,
        owner_id: OwnerId,
        id: GalleryId,
        show_on_profile: bool,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Gallery>>;

    /// Update title, date and slug of an Active gallery.
    async fn rename(&self, rename: &GalleryRename) -> AppResult<ChangeOutcome>;

    /// Delete one gallery, only if it is Trashed.
    async fn purge(&self, owner_id: OwnerId, id: GalleryId) -> AppResult<ChangeOutcome>;

    /// Archive the listed galleries of one owner and append the audit
    /// entry `audit` builds from the ids actually archived, as one unit of
    /// work.
    ///
    /// Galleries that are no longer Active are skipped. If the entry cannot
    /// be written nothing is archived. Returns the archived ids in the
    /// order given.
    async fn archive_many(
        &self,
        owner_id: OwnerId,
        ids: &[GalleryId],
        at: DateTime<Utc>,
        audit: &(dyn for<'g> Fn(&'g [GalleryId]) -> CreateAuditLogEntry + Send + Sync),
    ) -> AppResult<Vec<GalleryId>>;

    /// Trashed galleries whose `trashed_at` is strictly before `cutoff`.
    async fn find_trashed_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Gallery>>;

    /// Delete the listed galleries in a single statement, skipping any that
    /// were restored or re-trashed at or after `cutoff` since selection.
    async fn purge_many(
        &self,
        ids: &[GalleryId],
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<PurgedGallery>>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditRecorder: Debug + Send + Sync {
    /// Persist one entry.
    async fn record(&self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry>;

    /// Entries for an owner, newest first.
    async fn entries_for_owner(
        &self,
        owner_id: OwnerId,
        action: Option<&str>,
    ) -> AppResult<Vec<AuditLogEntry>>;
}
