//! Quota pre-flight handlers, used by the UI to decide whether to show an
//! upgrade prompt before the caller tries.

use axum::extract::{Path, State};

use galleryhub_core::types::GalleryId;
use galleryhub_service::QuotaSnapshot;

use crate::error::ServiceReply;
use crate::extractors::Caller;
use crate::state::AppState;

/// GET /api/quota
pub async fn can_create(
    State(state): State<AppState>,
    caller: Caller,
) -> ServiceReply<QuotaSnapshot> {
    state.lifecycle.can_create(&caller).await.into()
}

/// GET /api/galleries/{id}/quota
pub async fn can_reactivate(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<GalleryId>,
) -> ServiceReply<QuotaSnapshot> {
    state.lifecycle.can_reactivate(&caller, id).await.into()
}
