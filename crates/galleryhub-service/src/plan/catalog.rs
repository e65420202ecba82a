//! Read-only views of the entitlement matrix for pricing pages and upsell
//! prompts.

use std::sync::Arc;

use serde::Serialize;

use galleryhub_entity::plan::{Entitlements, FeatureDiff, FeatureKey, PermissionMatrix, PlanTier};

/// One tier as shown in the catalogue.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub tier: PlanTier,
    pub name: &'static str,
    pub entitlements: Entitlements,
}

/// Where to send an owner who wants a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsellSuggestion {
    pub feature: FeatureKey,
    pub current_tier: PlanTier,
    /// Whether the current tier already grants the feature.
    pub available_now: bool,
    /// First tier above the current one that grants it, or the top tier.
    pub suggested_tier: PlanTier,
}

/// Queries over the plan matrix.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    matrix: Arc<PermissionMatrix>,
}

impl PlanCatalog {
    /// Creates a catalogue over `matrix`.
    pub fn new(matrix: Arc<PermissionMatrix>) -> Self {
        Self { matrix }
    }

    /// Version tag of the underlying table.
    pub fn version(&self) -> &str {
        self.matrix.version()
    }

    /// Every tier with its entitlements, cheapest first.
    pub fn plans(&self) -> Vec<PlanSummary> {
        self.matrix
            .tiers()
            .map(|(tier, entitlements)| PlanSummary {
                tier,
                name: tier.display_name(),
                entitlements: entitlements.clone(),
            })
            .collect()
    }

    /// Entitlements of a single tier.
    pub fn plan(&self, tier: PlanTier) -> PlanSummary {
        PlanSummary {
            tier,
            name: tier.display_name(),
            entitlements: self.matrix.entitlements(tier).clone(),
        }
    }

    /// Dimensions that differ between two tiers.
    pub fn compare(&self, from: PlanTier, to: PlanTier) -> Vec<FeatureDiff> {
        self.matrix.compare(from, to)
    }

    /// Upsell target for `feature` starting from `current`.
    pub fn upsell(&self, current: PlanTier, feature: FeatureKey) -> UpsellSuggestion {
        UpsellSuggestion {
            feature,
            current_tier: current,
            available_now: self
                .matrix
                .is_feature_available(self.matrix.entitlements(current), feature),
            suggested_tier: self.matrix.next_tier_with_feature(current, feature),
        }
    }
}
