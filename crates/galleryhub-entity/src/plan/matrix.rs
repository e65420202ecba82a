//! The versioned tier → entitlements table.
//!
//! [`PermissionMatrix::standard`] is built once per process and never
//! mutated. Alternate tables go through [`PermissionMatrix::new`], which
//! rejects any table that is not monotonic across tier order.

use std::cmp::Ordering;
use std::sync::LazyLock;

use serde::Serialize;

use galleryhub_core::error::{AppError, ErrorKind};
use galleryhub_core::result::AppResult;

use super::entitlements::Entitlements;
use super::feature::{FeatureGroup, FeatureKey};
use super::tier::PlanTier;
use super::value::{
    CustomizationLevel, DownloadSize, EntitlementValue, Limit, PrivacyLevel, ProfileLevel, TagMode,
};

/// Version tag of the built-in table. Bump whenever a value changes.
pub const MATRIX_VERSION: &str = "2026-01";

static STANDARD: LazyLock<PermissionMatrix> = LazyLock::new(|| PermissionMatrix {
    version: MATRIX_VERSION.to_string(),
    rows: standard_rows(),
});

/// A field that decreases (or changes kind) between two adjacent tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonotonicityViolation {
    /// The offending dimension.
    pub feature: FeatureKey,
    /// The lower tier of the pair.
    pub lower: PlanTier,
    /// The higher tier of the pair.
    pub higher: PlanTier,
    /// Value at the lower tier.
    pub lower_value: EntitlementValue,
    /// Value at the higher tier.
    pub higher_value: EntitlementValue,
}

/// One dimension whose value differs between two tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureDiff {
    pub feature: FeatureKey,
    pub group: FeatureGroup,
    /// Value at the first tier compared.
    pub from: EntitlementValue,
    /// Value at the second tier compared.
    pub to: EntitlementValue,
}

/// Immutable mapping from every [`PlanTier`] to its [`Entitlements`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionMatrix {
    version: String,
    rows: [Entitlements; 5],
}

impl PermissionMatrix {
    /// The built-in production table.
    pub fn standard() -> &'static PermissionMatrix {
        &STANDARD
    }

    /// Build a table, rejecting any that is not monotonic.
    ///
    /// `rows` is indexed by [`PlanTier::index`].
    pub fn new(version: impl Into<String>, rows: [Entitlements; 5]) -> AppResult<Self> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(AppError::validation("Permission matrix version must not be empty"));
        }

        let matrix = Self { version, rows };
        if let Err(violations) = matrix.validate() {
            let first = &violations[0];
            return Err(AppError::new(
                ErrorKind::Configuration,
                format!(
                    "Permission matrix {} is not monotonic: {} drops from {} ({}) to {} ({}) \
                     and {} other violation(s)",
                    matrix.version,
                    first.feature,
                    first.lower,
                    first.lower_value,
                    first.higher,
                    first.higher_value,
                    violations.len() - 1
                ),
            )
            .with_details(serde_json::json!({ "violations": violations })));
        }
        Ok(matrix)
    }

    /// Version tag of this table.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Entitlements granted by `tier`.
    pub fn entitlements(&self, tier: PlanTier) -> &Entitlements {
        &self.rows[tier.index()]
    }

    /// Shortcut for the Active-gallery quota of `tier`.
    pub fn max_galleries(&self, tier: PlanTier) -> Limit {
        self.entitlements(tier).max_galleries
    }

    /// Every tier with its entitlements, ascending.
    pub fn tiers(&self) -> impl Iterator<Item = (PlanTier, &Entitlements)> {
        PlanTier::ALL
            .into_iter()
            .map(move |tier| (tier, self.entitlements(tier)))
    }

    /// Check that every field is non-decreasing across adjacent tiers.
    pub fn validate(&self) -> Result<(), Vec<MonotonicityViolation>> {
        let mut violations = Vec::new();

        for pair in PlanTier::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            let (lo, hi) = (self.entitlements(lower), self.entitlements(higher));
            for key in FeatureKey::ALL {
                let (lower_value, higher_value) = (lo.value(key), hi.value(key));
                match higher_value.partial_cmp(&lower_value) {
                    Some(Ordering::Greater | Ordering::Equal) => {}
                    _ => violations.push(MonotonicityViolation {
                        feature: key,
                        lower,
                        higher,
                        lower_value,
                        higher_value,
                    }),
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Whether `entitlements` grants `key` at all.
    ///
    /// Flags are their own value; limits must be positive (unlimited counts);
    /// levels must differ from the lowest tier's level for the same field.
    pub fn is_feature_available(&self, entitlements: &Entitlements, key: FeatureKey) -> bool {
        match entitlements.value(key) {
            EntitlementValue::Flag(on) => on,
            EntitlementValue::Limit(limit) => limit.is_positive(),
            level @ EntitlementValue::Level { .. } => {
                level != self.entitlements(PlanTier::lowest()).value(key)
            }
        }
    }

    /// First tier strictly above `from` that grants `key`, or the top tier.
    ///
    /// Used for upsell messaging only.
    pub fn next_tier_with_feature(&self, from: PlanTier, key: FeatureKey) -> PlanTier {
        from.above()
            .find(|tier| self.is_feature_available(self.entitlements(*tier), key))
            .unwrap_or(PlanTier::highest())
    }

    /// Dimensions whose value differs between `from` and `to`.
    pub fn compare(&self, from: PlanTier, to: PlanTier) -> Vec<FeatureDiff> {
        let (a, b) = (self.entitlements(from), self.entitlements(to));
        FeatureKey::ALL
            .into_iter()
            .filter_map(|key| {
                let (from, to) = (a.value(key), b.value(key));
                (from != to).then_some(FeatureDiff {
                    feature: key,
                    group: key.group(),
                    from,
                    to,
                })
            })
            .collect()
    }
}

fn standard_rows() -> [Entitlements; 5] {
    use Limit::{Count, Unlimited};

    [
        // Free
        Entitlements {
            max_galleries: Count(2),
            max_photos_per_gallery: Count(100),
            team_seats: Count(0),
            profile_page: ProfileLevel::Basic,
            featured_galleries: Count(0),
            lead_capture_form: false,
            lead_export: false,
            whatsapp_button: false,
            favorites: true,
            max_favorite_lists: Count(1),
            slideshow: false,
            grid_columns: Count(3),
            tag_mode: TagMode::Off,
            comments: false,
            download_size: DownloadSize::Web,
            zip_download: false,
            max_external_links: Count(0),
            privacy_level: PrivacyLevel::Public,
            keep_original_filenames: false,
            watermark: false,
            expiring_links: false,
            customization: CustomizationLevel::Standard,
            custom_domain: false,
            remove_branding: false,
        },
        // Start
        Entitlements {
            max_galleries: Count(10),
            max_photos_per_gallery: Count(500),
            team_seats: Count(0),
            profile_page: ProfileLevel::Basic,
            featured_galleries: Count(3),
            lead_capture_form: true,
            lead_export: false,
            whatsapp_button: true,
            favorites: true,
            max_favorite_lists: Count(3),
            slideshow: false,
            grid_columns: Count(4),
            tag_mode: TagMode::Off,
            comments: false,
            download_size: DownloadSize::High,
            zip_download: true,
            max_external_links: Count(1),
            privacy_level: PrivacyLevel::Password,
            keep_original_filenames: false,
            watermark: false,
            expiring_links: false,
            customization: CustomizationLevel::Standard,
            custom_domain: false,
            remove_branding: false,
        },
        // Plus
        Entitlements {
            max_galleries: Count(25),
            max_photos_per_gallery: Count(1500),
            team_seats: Count(1),
            profile_page: ProfileLevel::Branded,
            featured_galleries: Count(6),
            lead_capture_form: true,
            lead_export: true,
            whatsapp_button: true,
            favorites: true,
            max_favorite_lists: Count(10),
            slideshow: true,
            grid_columns: Count(5),
            tag_mode: TagMode::Manual,
            comments: false,
            download_size: DownloadSize::High,
            zip_download: true,
            max_external_links: Count(3),
            privacy_level: PrivacyLevel::Password,
            keep_original_filenames: false,
            watermark: true,
            expiring_links: false,
            customization: CustomizationLevel::Themes,
            custom_domain: false,
            remove_branding: false,
        },
        // Pro
        Entitlements {
            max_galleries: Count(50),
            max_photos_per_gallery: Count(5000),
            team_seats: Count(3),
            profile_page: ProfileLevel::Branded,
            featured_galleries: Count(12),
            lead_capture_form: true,
            lead_export: true,
            whatsapp_button: true,
            favorites: true,
            max_favorite_lists: Unlimited,
            slideshow: true,
            grid_columns: Count(6),
            tag_mode: TagMode::Manual,
            comments: true,
            download_size: DownloadSize::Original,
            zip_download: true,
            max_external_links: Count(10),
            privacy_level: PrivacyLevel::Private,
            keep_original_filenames: true,
            watermark: true,
            expiring_links: true,
            customization: CustomizationLevel::Themes,
            custom_domain: false,
            remove_branding: true,
        },
        // Premium
        Entitlements {
            max_galleries: Unlimited,
            max_photos_per_gallery: Unlimited,
            team_seats: Count(10),
            profile_page: ProfileLevel::Custom,
            featured_galleries: Unlimited,
            lead_capture_form: true,
            lead_export: true,
            whatsapp_button: true,
            favorites: true,
            max_favorite_lists: Unlimited,
            slideshow: true,
            grid_columns: Count(6),
            tag_mode: TagMode::Automatic,
            comments: true,
            download_size: DownloadSize::Original,
            zip_download: true,
            max_external_links: Unlimited,
            privacy_level: PrivacyLevel::Private,
            keep_original_filenames: true,
            watermark: true,
            expiring_links: true,
            customization: CustomizationLevel::FullBranding,
            custom_domain: true,
            remove_branding: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn matrix() -> &'static PermissionMatrix {
        PermissionMatrix::standard()
    }

    #[test]
    fn test_standard_matrix_is_monotonic() {
        assert_eq!(matrix().validate(), Ok(()));
        assert_eq!(matrix().version(), MATRIX_VERSION);
    }

    #[test]
    fn test_gallery_limits() {
        assert_eq!(matrix().max_galleries(PlanTier::Free), Limit::Count(2));
        assert_eq!(matrix().max_galleries(PlanTier::Pro), Limit::Count(50));
        assert_eq!(matrix().max_galleries(PlanTier::Premium), Limit::Unlimited);
    }

    #[test]
    fn test_new_rejects_decreasing_field() {
        let mut rows = standard_rows();
        rows[PlanTier::Pro.index()].watermark = false;

        let err = PermissionMatrix::new("broken", rows).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("watermark"));
        assert!(err.details.is_some());
    }

    #[test]
    fn test_new_accepts_valid_alternate_table() {
        let mut rows = standard_rows();
        rows[PlanTier::Free.index()].max_galleries = Limit::Count(1);

        let custom = PermissionMatrix::new("test-1", rows).unwrap();
        assert_eq!(custom.max_galleries(PlanTier::Free), Limit::Count(1));
        assert_eq!(matrix().max_galleries(PlanTier::Free), Limit::Count(2));
    }

    #[test]
    fn test_is_feature_available() {
        let free = matrix().entitlements(PlanTier::Free);
        let plus = matrix().entitlements(PlanTier::Plus);

        assert!(matrix().is_feature_available(free, FeatureKey::Favorites));
        assert!(!matrix().is_feature_available(free, FeatureKey::Slideshow));
        assert!(!matrix().is_feature_available(free, FeatureKey::TeamSeats));
        assert!(matrix().is_feature_available(plus, FeatureKey::TeamSeats));
        // Levels: only a value above the Free baseline counts.
        assert!(!matrix().is_feature_available(free, FeatureKey::TagMode));
        assert!(matrix().is_feature_available(plus, FeatureKey::TagMode));
        // Limits with a non-zero baseline are always available.
        assert!(matrix().is_feature_available(free, FeatureKey::GridColumns));
        assert!(
            matrix().is_feature_available(
                matrix().entitlements(PlanTier::Premium),
                FeatureKey::MaxExternalLinks
            )
        );
    }

    #[test]
    fn test_next_tier_with_feature() {
        assert_eq!(
            matrix().next_tier_with_feature(PlanTier::Free, FeatureKey::LeadExport),
            PlanTier::Plus
        );
        assert_eq!(
            matrix().next_tier_with_feature(PlanTier::Free, FeatureKey::CustomDomain),
            PlanTier::Premium
        );
        assert_eq!(
            matrix().next_tier_with_feature(PlanTier::Start, FeatureKey::Comments),
            PlanTier::Pro
        );
        // Nothing above the top tier: fall back to it.
        assert_eq!(
            matrix().next_tier_with_feature(PlanTier::Premium, FeatureKey::Slideshow),
            PlanTier::Premium
        );
    }

    #[test]
    fn test_compare_lists_only_changes() {
        assert!(matrix().compare(PlanTier::Pro, PlanTier::Pro).is_empty());

        let diffs = matrix().compare(PlanTier::Pro, PlanTier::Premium);
        let keys: Vec<_> = diffs.iter().map(|d| d.feature).collect();
        assert!(keys.contains(&FeatureKey::CustomDomain));
        assert!(!keys.contains(&FeatureKey::Comments));

        let domain = diffs
            .iter()
            .find(|d| d.feature == FeatureKey::CustomDomain)
            .unwrap();
        assert_eq!(domain.from, EntitlementValue::Flag(false));
        assert_eq!(domain.to, EntitlementValue::Flag(true));
        assert_eq!(domain.group, FeatureGroup::Delivery);
    }

    fn tier() -> impl Strategy<Value = PlanTier> {
        (0usize..PlanTier::ALL.len()).prop_map(|i| PlanTier::ALL[i])
    }

    fn feature() -> impl Strategy<Value = FeatureKey> {
        (0usize..FeatureKey::ALL.len()).prop_map(|i| FeatureKey::ALL[i])
    }

    proptest! {
        #[test]
        fn prop_entitlements_never_decrease(a in tier(), b in tier(), key in feature()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_value = matrix().entitlements(lo).value(key);
            let hi_value = matrix().entitlements(hi).value(key);
            prop_assert!(hi_value >= lo_value, "{key}: {lo}={lo_value} {hi}={hi_value}");
        }

        #[test]
        fn prop_availability_is_upward_closed(a in tier(), b in tier(), key in feature()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            if matrix().is_feature_available(matrix().entitlements(lo), key) {
                prop_assert!(matrix().is_feature_available(matrix().entitlements(hi), key));
            }
        }

        #[test]
        fn prop_upsell_points_upward(from in tier(), key in feature()) {
            let target = matrix().next_tier_with_feature(from, key);
            prop_assert!(target > from || target == PlanTier::highest());
            let grants = matrix().is_feature_available(matrix().entitlements(target), key);
            prop_assert!(grants || target == PlanTier::highest());
        }
    }
}
