//! Manual retention sweep endpoint.

use axum::extract::State;

use crate::dto::request::SweepRequest;
use crate::dto::response::SweepResponse;
use crate::error::ServiceReply;
use crate::extractors::{AdminCaller, ValidatedJson};
use crate::state::AppState;

/// POST /api/admin/sweep
pub async fn sweep(
    State(state): State<AppState>,
    _admin: AdminCaller,
    ValidatedJson(req): ValidatedJson<SweepRequest>,
) -> ServiceReply<SweepResponse> {
    let retention_days = req
        .retention_days
        .unwrap_or_else(|| state.purger.retention_days());

    state
        .purger
        .sweep(retention_days)
        .await
        .map(|purged| SweepResponse {
            retention_days,
            purged_count: purged.len(),
            purged,
        })
        .into()
}
