//! Gallery entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use galleryhub_core::types::{GalleryId, OwnerId};

use super::status::GalleryStatus;

/// A photo gallery owned by exactly one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Gallery {
    /// Unique gallery identifier.
    pub id: GalleryId,
    /// The owning account.
    pub owner_id: OwnerId,
    /// Globally unique path identifier (`handle/yyyy/mm/dd/title`).
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Event date; the recency key for downgrade reconciliation.
    pub event_date: NaiveDate,
    /// Lifecycle state.
    pub status: GalleryStatus,
    /// Whether the gallery is listed on the owner's public profile.
    pub show_on_profile: bool,
    /// When the gallery entered the trash. Set only while `Trashed`.
    pub trashed_at: Option<DateTime<Utc>>,
    /// When the gallery was created.
    pub created_at: DateTime<Utc>,
    /// When the gallery was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Gallery {
    /// Whether the gallery counts against the owner's quota.
    pub fn is_active(&self) -> bool {
        self.status == GalleryStatus::Active
    }

    /// Whether the gallery has been in the trash since before `cutoff`.
    pub fn trashed_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.status == GalleryStatus::Trashed && self.trashed_at.is_some_and(|t| t < cutoff)
    }

    /// Summary kept after the row is purged.
    pub fn purged_summary(&self) -> PurgedGallery {
        PurgedGallery {
            id: self.id,
            owner_id: self.owner_id,
            slug: self.slug.clone(),
        }
    }
}

/// Data required to insert a new gallery. New galleries start `Active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGallery {
    /// Pre-assigned identifier.
    pub id: GalleryId,
    /// The owning account.
    pub owner_id: OwnerId,
    /// Slug produced by the slug generator.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Event date.
    pub event_date: NaiveDate,
    /// Whether to list the gallery on the owner's profile.
    pub show_on_profile: bool,
    /// Creation instant from the engine clock.
    pub created_at: DateTime<Utc>,
}

impl NewGallery {
    /// Materialize the row a store would return after inserting this gallery.
    pub fn into_gallery(self) -> Gallery {
        Gallery {
            id: self.id,
            owner_id: self.owner_id,
            slug: self.slug,
            title: self.title,
            event_date: self.event_date,
            status: GalleryStatus::Active,
            show_on_profile: self.show_on_profile,
            trashed_at: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// What remains of a gallery after a purge; used by callers to release
/// external state (sharing permissions, stored files).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PurgedGallery {
    /// Identifier of the deleted gallery.
    pub id: GalleryId,
    /// Its former owner.
    pub owner_id: OwnerId,
    /// Its former slug.
    pub slug: String,
}
