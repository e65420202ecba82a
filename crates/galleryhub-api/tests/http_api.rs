//! Router-level tests over the in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use galleryhub_api::{AppState, build_app};
use galleryhub_core::config::AppConfig;
use galleryhub_core::traits::ManualClock;
use galleryhub_database::MemoryGalleryStore;
use galleryhub_entity::plan::PermissionMatrix;

struct Harness {
    app: Router,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    let config: AppConfig =
        serde_json::from_value(json!({ "database": { "url": "postgres://unused" } })).unwrap();
    let store = Arc::new(MemoryGalleryStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
    ));
    let state = AppState::build(
        config,
        store.clone(),
        store,
        clock.clone(),
        Arc::new(PermissionMatrix::standard().clone()),
    );
    Harness {
        app: build_app(state),
        clock,
    }
}

struct Owner {
    id: Uuid,
    handle: &'static str,
    tier: &'static str,
}

impl Owner {
    fn new(handle: &'static str, tier: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            handle,
            tier,
        }
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    owner: Option<&Owner>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(owner) = owner {
        req = req
            .header("x-owner-id", owner.id.to_string())
            .header("x-owner-handle", owner.handle)
            .header("x-owner-tier", owner.tier);
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, owner: &Owner, title: &str, date: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/galleries",
        Some(owner),
        Some(json!({ "title": title, "event_date": date })),
    )
    .await
}

#[tokio::test]
async fn create_returns_slug_and_enforces_quota() {
    let h = harness();
    let owner = Owner::new("hitalo", "free");

    let (status, body) = create(&h.app, &owner, "Casamento José & Maria!", "2026-01-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["slug"], "hitalo/2026/01/01/casamento-jose-e-maria");
    assert_eq!(body["data"]["status"], "active");

    create(&h.app, &owner, "Aniversário", "2026-01-02").await;
    let (status, body) = create(&h.app, &owner, "Batizado", "2026-01-03").await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "QUOTA_EXCEEDED");
    assert_eq!(body["error"]["details"]["limit"], 2);

    let (_, quota) = send(&h.app, "GET", "/api/quota", Some(&owner), None).await;
    assert_eq!(quota["data"]["allowed"], false);
    assert_eq!(quota["data"]["current_count"], 2);
}

#[tokio::test]
async fn missing_gateway_headers_are_rejected() {
    let h = harness();
    let (status, body) = send(&h.app, "GET", "/api/galleries", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "AUTHORIZATION");

    let bad_tier = Owner::new("x", "gold");
    let (status, _) = send(&h.app, "GET", "/api/galleries", Some(&bad_tier), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_title_fails_validation() {
    let h = harness();
    let owner = Owner::new("ana", "start");
    let (status, body) = create(&h.app, &owner, "", "2026-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION");
}

#[tokio::test]
async fn lifecycle_transitions_over_http() {
    let h = harness();
    let owner = Owner::new("bia", "start");
    let (_, body) = create(&h.app, &owner, "Ensaio", "2026-01-05").await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &h.app,
        "POST",
        &format!("/api/galleries/{id}/archive"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "archived");

    // Archived → Archived is not in the table.
    let (status, body) = send(
        &h.app,
        "POST",
        &format!("/api/galleries/{id}/archive"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

    let (_, body) = send(
        &h.app,
        "POST",
        &format!("/api/galleries/{id}/trash"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(body["data"]["status"], "trashed");

    let (status, body) = send(
        &h.app,
        "DELETE",
        &format!("/api/galleries/{id}"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());

    let (_, body) = send(&h.app, "GET", "/api/galleries", Some(&owner), None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn foreign_gallery_is_indistinguishable_from_missing() {
    let h = harness();
    let alice = Owner::new("alice", "pro");
    let bob = Owner::new("bob", "pro");
    let (_, body) = create(&h.app, &alice, "Privada", "2026-01-01").await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (s1, foreign) = send(
        &h.app,
        "POST",
        &format!("/api/galleries/{id}/trash"),
        Some(&bob),
        None,
    )
    .await;
    let (s2, missing) = send(
        &h.app,
        "POST",
        &format!("/api/galleries/{}/trash", Uuid::new_v4()),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(s1, s2);
    assert_eq!(foreign, missing);
}

#[tokio::test]
async fn plan_catalogue_is_public() {
    let h = harness();
    let (status, body) = send(&h.app, "GET", "/api/plans", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["plans"].as_array().unwrap().len(), 5);

    let (_, body) = send(
        &h.app,
        "GET",
        "/api/plans/free/upsell/watermark",
        None,
        None,
    )
    .await;
    assert_eq!(body["data"]["available_now"], false);
    assert_eq!(body["data"]["suggested_tier"], "plus");

    let (status, _) = send(&h.app, "GET", "/api/plans/gold", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_reconcile_and_sweep() {
    let h = harness();
    let owner = Owner::new("caio", "pro");
    for day in 1..=3 {
        create(&h.app, &owner, &format!("Evento {day}"), &format!("2026-01-0{day}")).await;
    }

    let reconcile = json!({
        "owner_id": owner.id,
        "old_tier": "pro",
        "new_tier": "free",
    });
    let (status, _) = send(&h.app, "POST", "/api/admin/reconcile", None, Some(reconcile.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = Request::builder()
        .method("POST")
        .uri("/api/admin/reconcile")
        .header("x-gateway-role", "admin")
        .header("content-type", "application/json")
        .body(Body::from(reconcile.to_string()))
        .unwrap();
    let resp = h.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["data"]["archived_count"], 1);
    assert_eq!(body["data"]["new_limit"], 2);

    // Trash one, then sweep after the window.
    let (_, list) = send(
        &h.app,
        "GET",
        "/api/galleries?status=active",
        Some(&owner),
        None,
    )
    .await;
    let id = list["data"][0]["id"].as_str().unwrap().to_string();
    send(
        &h.app,
        "POST",
        &format!("/api/galleries/{id}/trash"),
        Some(&owner),
        None,
    )
    .await;
    h.clock.advance(Duration::days(31));

    let req = Request::builder()
        .method("POST")
        .uri("/api/admin/sweep")
        .header("x-gateway-role", "admin")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let resp = h.app.clone().oneshot(req).await.unwrap();
    let body: Value =
        serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["data"]["retention_days"], 30);
    assert_eq!(body["data"]["purged_count"], 1);
    assert_eq!(body["data"]["purged"][0]["id"], id.as_str());
}
