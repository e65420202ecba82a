//! Route definitions for the GalleryHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Build the API router and thread `state` through every route.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(gallery_routes())
        .merge(quota_routes())
        .merge(plan_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Gallery CRUD and lifecycle transitions
fn gallery_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/galleries",
            get(handlers::gallery::list_galleries).post(handlers::gallery::create_gallery),
        )
        .route(
            "/galleries/{id}",
            put(handlers::gallery::rename_gallery).delete(handlers::gallery::purge_gallery),
        )
        .route(
            "/galleries/{id}/archive",
            post(handlers::gallery::archive_gallery),
        )
        .route(
            "/galleries/{id}/unarchive",
            post(handlers::gallery::unarchive_gallery),
        )
        .route("/galleries/{id}/trash", post(handlers::gallery::trash_gallery))
        .route(
            "/galleries/{id}/restore",
            post(handlers::gallery::restore_gallery),
        )
        .route(
            "/galleries/{id}/visibility",
            put(handlers::gallery::set_visibility),
        )
        .route(
            "/galleries/{id}/visibility/toggle",
            post(handlers::gallery::toggle_visibility),
        )
}

/// Quota pre-flight checks
fn quota_routes() -> Router<AppState> {
    Router::new()
        .route("/quota", get(handlers::quota::can_create))
        .route("/galleries/{id}/quota", get(handlers::quota::can_reactivate))
}

/// Plan catalogue
fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(handlers::plan::list_plans))
        .route("/plans/compare", get(handlers::plan::compare_plans))
        .route("/plans/{tier}", get(handlers::plan::get_plan))
        .route(
            "/plans/{tier}/upsell/{feature}",
            get(handlers::plan::upsell),
        )
}

/// Operator endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/reconcile", post(handlers::admin::reconcile::reconcile))
        .route("/admin/sweep", post(handlers::admin::sweep::sweep))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
