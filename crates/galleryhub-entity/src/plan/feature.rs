//! Entitlement dimension keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conceptual grouping of entitlements, used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    /// Counts of galleries, photos and seats.
    Management,
    /// Public profile and display.
    Profile,
    /// Lead capture tools.
    LeadCapture,
    /// Client viewing experience.
    Experience,
    /// Delivery and security.
    Delivery,
}

impl FeatureGroup {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Management => "management",
            Self::Profile => "profile",
            Self::LeadCapture => "lead_capture",
            Self::Experience => "experience",
            Self::Delivery => "delivery",
        }
    }
}

/// Names one entitlement dimension of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    MaxGalleries,
    MaxPhotosPerGallery,
    TeamSeats,
    ProfilePage,
    FeaturedGalleries,
    LeadCaptureForm,
    LeadExport,
    WhatsappButton,
    Favorites,
    MaxFavoriteLists,
    Slideshow,
    GridColumns,
    TagMode,
    Comments,
    DownloadSize,
    ZipDownload,
    MaxExternalLinks,
    PrivacyLevel,
    KeepOriginalFilenames,
    Watermark,
    ExpiringLinks,
    Customization,
    CustomDomain,
    RemoveBranding,
}

impl FeatureKey {
    /// Every entitlement dimension, in display order.
    pub const ALL: [FeatureKey; 24] = [
        Self::MaxGalleries,
        Self::MaxPhotosPerGallery,
        Self::TeamSeats,
        Self::ProfilePage,
        Self::FeaturedGalleries,
        Self::LeadCaptureForm,
        Self::LeadExport,
        Self::WhatsappButton,
        Self::Favorites,
        Self::MaxFavoriteLists,
        Self::Slideshow,
        Self::GridColumns,
        Self::TagMode,
        Self::Comments,
        Self::DownloadSize,
        Self::ZipDownload,
        Self::MaxExternalLinks,
        Self::PrivacyLevel,
        Self::KeepOriginalFilenames,
        Self::Watermark,
        Self::ExpiringLinks,
        Self::Customization,
        Self::CustomDomain,
        Self::RemoveBranding,
    ];

    /// The group this entitlement belongs to.
    pub fn group(&self) -> FeatureGroup {
        match self {
            Self::MaxGalleries | Self::MaxPhotosPerGallery | Self::TeamSeats => {
                FeatureGroup::Management
            }
            Self::ProfilePage | Self::FeaturedGalleries => FeatureGroup::Profile,
            Self::LeadCaptureForm | Self::LeadExport | Self::WhatsappButton => {
                FeatureGroup::LeadCapture
            }
            Self::Favorites
            | Self::MaxFavoriteLists
            | Self::Slideshow
            | Self::GridColumns
            | Self::TagMode
            | Self::Comments => FeatureGroup::Experience,
            Self::DownloadSize
            | Self::ZipDownload
            | Self::MaxExternalLinks
            | Self::PrivacyLevel
            | Self::KeepOriginalFilenames
            | Self::Watermark
            | Self::ExpiringLinks
            | Self::Customization
            | Self::CustomDomain
            | Self::RemoveBranding => FeatureGroup::Delivery,
        }
    }

    /// Return the key as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxGalleries => "max_galleries",
            Self::MaxPhotosPerGallery => "max_photos_per_gallery",
            Self::TeamSeats => "team_seats",
            Self::ProfilePage => "profile_page",
            Self::FeaturedGalleries => "featured_galleries",
            Self::LeadCaptureForm => "lead_capture_form",
            Self::LeadExport => "lead_export",
            Self::WhatsappButton => "whatsapp_button",
            Self::Favorites => "favorites",
            Self::MaxFavoriteLists => "max_favorite_lists",
            Self::Slideshow => "slideshow",
            Self::GridColumns => "grid_columns",
            Self::TagMode => "tag_mode",
            Self::Comments => "comments",
            Self::DownloadSize => "download_size",
            Self::ZipDownload => "zip_download",
            Self::MaxExternalLinks => "max_external_links",
            Self::PrivacyLevel => "privacy_level",
            Self::KeepOriginalFilenames => "keep_original_filenames",
            Self::Watermark => "watermark",
            Self::ExpiringLinks => "expiring_links",
            Self::Customization => "customization",
            Self::CustomDomain => "custom_domain",
            Self::RemoveBranding => "remove_branding",
        }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeatureKey {
    type Err = galleryhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == wanted)
            .ok_or_else(|| {
                galleryhub_core::AppError::validation(format!("Unknown plan feature: '{s}'"))
            })
    }
}
