//! Subscription tiers and the entitlement matrix.
//!
//! The matrix is immutable and versioned. Every entitlement is
//! monotonically non-decreasing across [`PlanTier`] order; the
//! [`PermissionMatrix::validate`] check enforces it for any table.

pub mod entitlements;
pub mod feature;
pub mod matrix;
pub mod tier;
pub mod value;

pub use entitlements::Entitlements;
pub use feature::{FeatureGroup, FeatureKey};
pub use matrix::{FeatureDiff, MATRIX_VERSION, MonotonicityViolation, PermissionMatrix};
pub use tier::PlanTier;
pub use value::{
    CustomizationLevel, DownloadSize, EntitlementValue, Limit, PrivacyLevel, ProfileLevel,
    TagMode,
};
