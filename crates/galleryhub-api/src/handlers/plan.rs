//! Plan catalogue handlers. Public: no caller identity required.

use axum::extract::{Path, Query, State};

use galleryhub_core::result::AppResult;
use galleryhub_core::types::ServiceResponse;
use galleryhub_entity::plan::{FeatureKey, PlanTier};
use galleryhub_service::{PlanSummary, UpsellSuggestion};

use crate::dto::request::CompareQuery;
use crate::dto::response::{CompareResponse, PlansResponse};
use crate::error::ServiceReply;
use crate::state::AppState;

/// GET /api/plans
pub async fn list_plans(State(state): State<AppState>) -> ServiceReply<PlansResponse> {
    ServiceReply(ServiceResponse::ok(PlansResponse {
        version: state.catalog.version().to_string(),
        plans: state.catalog.plans(),
    }))
}

/// GET /api/plans/{tier}
pub async fn get_plan(
    State(state): State<AppState>,
    Path(tier): Path<String>,
) -> ServiceReply<PlanSummary> {
    let plan: AppResult<PlanSummary> = tier.parse::<PlanTier>().map(|t| state.catalog.plan(t));
    plan.into()
}

/// GET /api/plans/compare?from=...&to=...
pub async fn compare_plans(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> ServiceReply<CompareResponse> {
    ServiceReply(ServiceResponse::ok(CompareResponse {
        from: query.from,
        to: query.to,
        differences: state.catalog.compare(query.from, query.to),
    }))
}

/// GET /api/plans/{tier}/upsell/{feature}
pub async fn upsell(
    State(state): State<AppState>,
    Path((tier, feature)): Path<(String, String)>,
) -> ServiceReply<UpsellSuggestion> {
    let suggestion: AppResult<UpsellSuggestion> = tier.parse::<PlanTier>().and_then(|tier| {
        let feature = feature.parse::<FeatureKey>()?;
        Ok(state.catalog.upsell(tier, feature))
    });
    suggestion.into()
}
