//! Gallery lifecycle states and the transition table between them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Persisted lifecycle state of a gallery.
///
/// `Purged` is not a variant: a purged gallery no longer has a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gallery_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GalleryStatus {
    /// Visible and counted against the plan quota.
    Active,
    /// Hidden from clients, kept, not counted.
    Archived,
    /// Soft-deleted, waiting for restore or purge.
    Trashed,
}

impl GalleryStatus {
    /// All live states.
    pub const ALL: [GalleryStatus; 3] = [Self::Active, Self::Archived, Self::Trashed];

    /// Whether galleries in this state count against the plan quota.
    pub fn counts_against_quota(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Trashed => "trashed",
        }
    }
}

impl fmt::Display for GalleryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GalleryStatus {
    type Err = galleryhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            "trashed" => Ok(Self::Trashed),
            _ => Err(galleryhub_core::AppError::validation(format!(
                "Invalid gallery status: '{s}'. Expected one of: active, archived, trashed"
            ))),
        }
    }
}

/// An owner-initiated lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    /// Active → Archived.
    Archive,
    /// Archived → Active.
    Unarchive,
    /// Active | Archived → Trashed.
    Trash,
    /// Trashed → Active.
    Restore,
    /// Trashed → row deleted.
    Purge,
}

/// Where a lifecycle event leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The gallery moves to another live state.
    To(GalleryStatus),
    /// The gallery is deleted permanently.
    Purged,
}

impl LifecycleEvent {
    /// All lifecycle events.
    pub const ALL: [LifecycleEvent; 5] = [
        Self::Archive,
        Self::Unarchive,
        Self::Trash,
        Self::Restore,
        Self::Purge,
    ];

    /// Resolve this event against the current state.
    ///
    /// Returns `None` when the event is not allowed from `from`.
    pub fn apply(self, from: GalleryStatus) -> Option<Transition> {
        use GalleryStatus::*;

        match (self, from) {
            (Self::Archive, Active) => Some(Transition::To(Archived)),
            (Self::Unarchive, Archived) => Some(Transition::To(Active)),
            (Self::Trash, Active | Archived) => Some(Transition::To(Trashed)),
            // Restore never remembers a prior archived state.
            (Self::Restore, Trashed) => Some(Transition::To(Active)),
            (Self::Purge, Trashed) => Some(Transition::Purged),
            _ => None,
        }
    }

    /// States from which this event is accepted.
    pub fn allowed_from(self) -> &'static [GalleryStatus] {
        match self {
            Self::Archive => &[GalleryStatus::Active],
            Self::Unarchive => &[GalleryStatus::Archived],
            Self::Trash => &[GalleryStatus::Active, GalleryStatus::Archived],
            Self::Restore | Self::Purge => &[GalleryStatus::Trashed],
        }
    }

    /// Whether the event re-enters the Active set and must pass the quota guard.
    pub fn consumes_quota(self) -> bool {
        matches!(self, Self::Unarchive | Self::Restore)
    }

    /// Return the event as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Unarchive => "unarchive",
            Self::Trash => "trash",
            Self::Restore => "restore",
            Self::Purge => "purge",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
