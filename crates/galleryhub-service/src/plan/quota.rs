//! Active-gallery quota checks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use galleryhub_core::error::AppError;
use galleryhub_core::result::AppResult;
use galleryhub_core::types::{GalleryId, OwnerId};
use galleryhub_database::GalleryStore;
use galleryhub_entity::gallery::{Gallery, GalleryStatus};
use galleryhub_entity::plan::{Limit, PermissionMatrix, PlanTier};

use crate::gallery::lifecycle::access_denied;

/// Outcome of a quota check.
///
/// A refusal is data, not an error: `message` is ready to show to the
/// owner and names the tier and its limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    /// Whether one more Active gallery is permitted.
    pub allowed: bool,
    /// Active galleries the owner holds. `None` when the check
    /// short-circuited without counting.
    pub current_count: Option<u64>,
    /// Maximum Active galleries for `tier`.
    pub limit: Limit,
    /// The tier the check ran against.
    pub tier: PlanTier,
    /// Cheapest tier with a higher limit, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_tier: Option<PlanTier>,
    /// Human-readable refusal, set only when `allowed` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QuotaSnapshot {
    /// Convert a refusal into a `QuotaExceeded` error carrying this
    /// snapshot as details.
    pub fn into_error(self) -> AppError {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("The {} plan quota is exhausted", self.tier.display_name()));
        let details = serde_json::json!({
            "tier": self.tier,
            "limit": self.limit,
            "current_count": self.current_count,
            "upgrade_tier": self.upgrade_tier,
        });
        AppError::quota_exceeded(message).with_details(details)
    }
}

/// Decides whether a gallery may enter the Active set.
#[derive(Debug, Clone)]
pub struct QuotaGuard {
    store: Arc<dyn GalleryStore>,
    matrix: Arc<PermissionMatrix>,
}

impl QuotaGuard {
    /// Creates a new quota guard.
    pub fn new(store: Arc<dyn GalleryStore>, matrix: Arc<PermissionMatrix>) -> Self {
        Self { store, matrix }
    }

    /// The entitlement table in use.
    pub fn matrix(&self) -> &PermissionMatrix {
        &self.matrix
    }

    /// Whether `owner_id` may create another gallery on `tier`.
    pub async fn can_create(&self, owner_id: OwnerId, tier: PlanTier) -> AppResult<QuotaSnapshot> {
        let current = self
            .store
            .count_by_status(owner_id, GalleryStatus::Active)
            .await?;
        Ok(self.evaluate(tier, current))
    }

    /// Whether the gallery may be unarchived or restored on `tier`.
    ///
    /// A gallery that is already Active is allowed without counting.
    pub async fn can_reactivate(
        &self,
        owner_id: OwnerId,
        tier: PlanTier,
        gallery_id: GalleryId,
    ) -> AppResult<QuotaSnapshot> {
        let gallery = self
            .store
            .find_owned(owner_id, gallery_id)
            .await?
            .ok_or_else(|| access_denied(owner_id, gallery_id))?;
        self.check_reactivate(&gallery, tier).await
    }

    /// [`Self::can_reactivate`] for a gallery the caller already loaded.
    pub async fn check_reactivate(
        &self,
        gallery: &Gallery,
        tier: PlanTier,
    ) -> AppResult<QuotaSnapshot> {
        if gallery.is_active() {
            return Ok(QuotaSnapshot {
                allowed: true,
                current_count: None,
                limit: self.matrix.max_galleries(tier),
                tier,
                upgrade_tier: None,
                message: None,
            });
        }
        self.can_create(gallery.owner_id, tier).await
    }

    /// Build the snapshot for an observed Active count.
    pub fn evaluate(&self, tier: PlanTier, current: u64) -> QuotaSnapshot {
        let limit = self.matrix.max_galleries(tier);
        let allowed = limit.allows(current);
        let upgrade_tier = (!allowed).then(|| self.upgrade_for(tier, limit)).flatten();

        let message = (!allowed).then(|| {
            let mut msg = format!(
                "Your {} plan allows up to {} active galleries and you have {}.",
                tier.display_name(),
                limit,
                current
            );
            match upgrade_tier {
                Some(next) => msg.push_str(&format!(
                    " Archive or delete a gallery, or upgrade to {} for more.",
                    next.display_name()
                )),
                None => msg.push_str(" Archive or delete a gallery to make room."),
            }
            msg
        });

        if !allowed {
            debug!(
                tier = %tier,
                limit = %limit,
                current = current,
                "Active gallery quota reached"
            );
        }

        QuotaSnapshot {
            allowed,
            current_count: Some(current),
            limit,
            tier,
            upgrade_tier,
            message,
        }
    }

    fn upgrade_for(&self, tier: PlanTier, limit: Limit) -> Option<PlanTier> {
        tier.above()
            .find(|t| self.matrix.max_galleries(*t) > limit)
    }
}
