//! Downgrade reconciliation endpoint.

use axum::extract::State;

use galleryhub_service::{DowngradeEvent, ReconcileReport};

use crate::dto::request::ReconcileRequest;
use crate::error::ServiceReply;
use crate::extractors::{AdminCaller, ValidatedJson};
use crate::state::AppState;

/// POST /api/admin/reconcile
pub async fn reconcile(
    State(state): State<AppState>,
    _admin: AdminCaller,
    ValidatedJson(req): ValidatedJson<ReconcileRequest>,
) -> ServiceReply<ReconcileReport> {
    let mut event =
        DowngradeEvent::for_tier(req.owner_id, req.old_tier, req.new_tier, &state.matrix);
    if let Some(limit) = req.new_limit {
        event.new_limit = limit;
    }

    state.reconciler.reconcile(&event).await.into()
}
