//! Request context carrying the resolved caller identity and plan.

use serde::{Deserialize, Serialize};

use galleryhub_core::types::OwnerId;
use galleryhub_entity::plan::PlanTier;

/// Who is acting, as resolved by the identity provider.
///
/// The engine trusts this value and never re-authenticates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The calling account.
    pub owner_id: OwnerId,
    /// Public handle; the first segment of every slug the owner creates.
    pub owner_handle: String,
    /// The owner's current subscription tier.
    pub tier: PlanTier,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(owner_id: OwnerId, owner_handle: impl Into<String>, tier: PlanTier) -> Self {
        Self {
            owner_id,
            owner_handle: owner_handle.into(),
            tier,
        }
    }
}
