//! The per-tier entitlement record.

use serde::{Deserialize, Serialize};

use super::feature::FeatureKey;
use super::value::{
    CustomizationLevel, DownloadSize, EntitlementValue, Limit, PrivacyLevel, ProfileLevel, TagMode,
};

/// Everything a single plan tier grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlements {
    // -- management
    /// Maximum number of Active galleries.
    pub max_galleries: Limit,
    pub max_photos_per_gallery: Limit,
    pub team_seats: Limit,

    // -- profile / display
    pub profile_page: ProfileLevel,
    pub featured_galleries: Limit,

    // -- lead capture
    pub lead_capture_form: bool,
    pub lead_export: bool,
    pub whatsapp_button: bool,

    // -- experience
    pub favorites: bool,
    pub max_favorite_lists: Limit,
    pub slideshow: bool,
    /// Maximum grid columns in the client gallery view.
    pub grid_columns: Limit,
    pub tag_mode: TagMode,
    pub comments: bool,

    // -- delivery / security
    pub download_size: DownloadSize,
    pub zip_download: bool,
    pub max_external_links: Limit,
    pub privacy_level: PrivacyLevel,
    pub keep_original_filenames: bool,
    pub watermark: bool,
    pub expiring_links: bool,
    pub customization: CustomizationLevel,
    pub custom_domain: bool,
    pub remove_branding: bool,
}

impl Entitlements {
    /// Read one dimension as a tagged value.
    pub fn value(&self, key: FeatureKey) -> EntitlementValue {
        match key {
            FeatureKey::MaxGalleries => self.max_galleries.into(),
            FeatureKey::MaxPhotosPerGallery => self.max_photos_per_gallery.into(),
            FeatureKey::TeamSeats => self.team_seats.into(),
            FeatureKey::ProfilePage => self.profile_page.into(),
            FeatureKey::FeaturedGalleries => self.featured_galleries.into(),
            FeatureKey::LeadCaptureForm => self.lead_capture_form.into(),
            FeatureKey::LeadExport => self.lead_export.into(),
            FeatureKey::WhatsappButton => self.whatsapp_button.into(),
            FeatureKey::Favorites => self.favorites.into(),
            FeatureKey::MaxFavoriteLists => self.max_favorite_lists.into(),
            FeatureKey::Slideshow => self.slideshow.into(),
            FeatureKey::GridColumns => self.grid_columns.into(),
            FeatureKey::TagMode => self.tag_mode.into(),
            FeatureKey::Comments => self.comments.into(),
            FeatureKey::DownloadSize => self.download_size.into(),
            FeatureKey::ZipDownload => self.zip_download.into(),
            FeatureKey::MaxExternalLinks => self.max_external_links.into(),
            FeatureKey::PrivacyLevel => self.privacy_level.into(),
            FeatureKey::KeepOriginalFilenames => self.keep_original_filenames.into(),
            FeatureKey::Watermark => self.watermark.into(),
            FeatureKey::ExpiringLinks => self.expiring_links.into(),
            FeatureKey::Customization => self.customization.into(),
            FeatureKey::CustomDomain => self.custom_domain.into(),
            FeatureKey::RemoveBranding => self.remove_branding.into(),
        }
    }

    /// All dimensions paired with their values, in display order.
    pub fn values(&self) -> impl Iterator<Item = (FeatureKey, EntitlementValue)> + '_ {
        FeatureKey::ALL.into_iter().map(|key| (key, self.value(key)))
    }
}
