//! Request DTOs with validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use galleryhub_core::types::OwnerId;
use galleryhub_entity::gallery::GalleryStatus;
use galleryhub_entity::plan::{Limit, PlanTier};
use galleryhub_service::{CreateGallery, RenameGallery};

/// Create gallery request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGalleryRequest {
    /// Gallery title.
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    /// Date of the photographed event.
    pub event_date: NaiveDate,
    /// List on the public profile (default: true).
    pub show_on_profile: Option<bool>,
}

impl From<CreateGalleryRequest> for CreateGallery {
    fn from(req: CreateGalleryRequest) -> Self {
        Self {
            title: req.title,
            event_date: req.event_date,
            show_on_profile: req.show_on_profile.unwrap_or(true),
        }
    }
}

/// Rename gallery request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameGalleryRequest {
    /// New title.
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    /// New event date; unchanged when absent.
    pub event_date: Option<NaiveDate>,
}

impl From<RenameGalleryRequest> for RenameGallery {
    fn from(req: RenameGalleryRequest) -> Self {
        Self {
            title: req.title,
            event_date: req.event_date,
        }
    }
}

/// Visibility update body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VisibilityRequest {
    /// New value of the show-on-profile flag.
    pub show_on_profile: bool,
}

/// Query string for gallery listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListGalleriesQuery {
    /// Restrict to one lifecycle status.
    pub status: Option<GalleryStatus>,
}

/// Query string for tier comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareQuery {
    /// Tier to compare from.
    pub from: PlanTier,
    /// Tier to compare to.
    pub to: PlanTier,
}

/// Tier change delivered by billing.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReconcileRequest {
    /// Affected owner.
    pub owner_id: OwnerId,
    /// Previous tier, if known.
    pub old_tier: Option<PlanTier>,
    /// Tier now in force.
    pub new_tier: PlanTier,
    /// Explicit limit; defaults to the matrix quota of `new_tier`.
    pub new_limit: Option<Limit>,
}

/// Manual retention sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SweepRequest {
    /// Retention window override in days.
    #[validate(range(max = 3650))]
    pub retention_days: Option<u32>,
}
