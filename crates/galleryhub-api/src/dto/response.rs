//! Response DTOs.

use serde::{Deserialize, Serialize};

use galleryhub_entity::gallery::PurgedGallery;
use galleryhub_entity::plan::{FeatureDiff, PlanTier};
use galleryhub_service::PlanSummary;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Build version.
    pub version: String,
    /// `connected`, `unavailable` or `memory`.
    pub database: String,
}

/// Plan catalogue response.
#[derive(Debug, Clone, Serialize)]
pub struct PlansResponse {
    /// Matrix version tag.
    pub version: String,
    /// Tiers, cheapest first.
    pub plans: Vec<PlanSummary>,
}

/// Tier comparison response.
#[derive(Debug, Clone, Serialize)]
pub struct CompareResponse {
    /// Tier compared from.
    pub from: PlanTier,
    /// Tier compared to.
    pub to: PlanTier,
    /// Dimensions whose value differs.
    pub differences: Vec<FeatureDiff>,
}

/// Retention sweep result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResponse {
    /// Window applied.
    pub retention_days: u32,
    /// Number of galleries removed.
    pub purged_count: usize,
    /// Removed galleries.
    pub purged: Vec<PurgedGallery>,
}
