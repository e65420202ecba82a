//! Gallery lifecycle handlers.

use axum::extract::{Path, Query, State};

use galleryhub_core::types::GalleryId;
use galleryhub_entity::gallery::{Gallery, PurgedGallery};

use crate::dto::request::{
    CreateGalleryRequest, ListGalleriesQuery, RenameGalleryRequest, VisibilityRequest,
};
use crate::error::ServiceReply;
use crate::extractors::{Caller, ValidatedJson};
use crate::state::AppState;

/// GET /api/galleries?status=...
pub async fn list_galleries(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListGalleriesQuery>,
) -> ServiceReply<Vec<Gallery>> {
    state.lifecycle.list(&caller, query.status).await.into()
}

/// POST /api/galleries
pub async fn create_gallery(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(req): ValidatedJson<CreateGalleryRequest>,
) -> ServiceReply<Gallery> {
    state.lifecycle.create(&caller, req.into()).await.into()
}

/// PUT /api/galleries/{id}
pub async fn rename_gallery(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<GalleryId>,
    ValidatedJson(req): ValidatedJson<RenameGalleryRequest>,
) -> ServiceReply<Gallery> {
    state.lifecycle.rename(&caller, id, req.into()).await.into()
}

/// POST /api/galleries/{id}/archive
pub async fn archive_gallery(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<GalleryId>,
) -> ServiceReply<Gallery> {
    state.lifecycle.archive(&caller, id).await.into()
}

/// POST /api/galleries/{id}/unarchive
pub async fn unarchive_gallery(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<GalleryId>,
) -> ServiceReply<Gallery> {
    state.lifecycle.unarchive(&caller, id).await.into()
}

/// POST /api/galleries/{id}/trash
pub async fn trash_gallery(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<GalleryId>,
) -> ServiceReply<Gallery> {
    state.lifecycle.trash(&caller, id).await.into()
}

/// POST /api/galleries/{id}/restore
pub async fn restore_gallery(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<GalleryId>,
) -> ServiceReply<Gallery> {
    state.lifecycle.restore(&caller, id).await.into()
}

/// DELETE /api/galleries/{id}
pub async fn purge_gallery(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<GalleryId>,
) -> ServiceReply<PurgedGallery> {
    state.lifecycle.purge(&caller, id).await.into()
}

/// PUT /api/galleries/{id}/visibility
pub async fn set_visibility(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<GalleryId>,
    ValidatedJson(req): ValidatedJson<VisibilityRequest>,
) -> ServiceReply<Gallery> {
    state
        .lifecycle
        .set_visibility(&caller, id, req.show_on_profile)
        .await
        .into()
}

/// POST /api/galleries/{id}/visibility/toggle
pub async fn toggle_visibility(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<GalleryId>,
) -> ServiceReply<Gallery> {
    state.lifecycle.toggle_visibility(&caller, id).await.into()
}
