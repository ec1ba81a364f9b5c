//! Integration tests for the monitor API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use linewatch_server::router::build_router;
use linewatch_server::state::{AppState, WAITING_FOR_SIGNAL};
use linewatch_types::LimitTable;
use serde_json::{json, Value};
use tower::ServiceExt;

fn make_test_state() -> Arc<AppState> {
    Arc::new(AppState::new(LimitTable::default()))
}

fn upload_body(die_temp: f64) -> Value {
    json!({
        "pultrusion": {"die_temp": die_temp, "resin_temp": 40.0, "motor_temp": 30.0, "status": "?"},
        "encapsulation": {"core_temp": 80.0, "motor_temp": 65.0, "psu_temp": 55.0, "machine_temp": 45.0, "status": "?"},
        "conforming": {"strands_temp": 75.0, "motor_temp": 65.0, "psu_temp": 55.0, "unit_temp": 45.0, "status": "?"},
        "stranding": {"psu_temp": 55.0, "motor_temp": 65.0, "status": "?"}
    })
}

fn post_upload(body: &Value) -> Request<Body> {
    Request::post("/api/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_status_before_first_upload_returns_sentinel() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["data"].is_null());
    assert_eq!(json["last_updated"], WAITING_FOR_SIGNAL);
}

#[tokio::test]
async fn test_upload_accepts_valid_payload() {
    let router = build_router(make_test_state());

    let response = router.oneshot(post_upload(&upload_body(85.0))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["msg"], "OK");
}

#[tokio::test]
async fn test_upload_then_status_round_trips_values() {
    let state = make_test_state();

    let response = build_router(Arc::clone(&state))
        .oneshot(post_upload(&upload_body(85.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = build_router(state)
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"]["pultrusion"]["die_temp"], 85.0);
    assert_eq!(json["data"]["stranding"]["psu_temp"], 55.0);
    // HH:MM:SS freshness label, not the sentinel.
    let label = json["last_updated"].as_str().unwrap();
    assert_ne!(label, WAITING_FOR_SIGNAL);
    assert_eq!(label.len(), 8);
}

#[tokio::test]
async fn test_over_limit_reading_derives_warning_status() {
    // die_temp 95 against the default limit of 90.
    let state = make_test_state();

    let response = build_router(Arc::clone(&state))
        .oneshot(post_upload(&upload_body(95.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = build_router(state)
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"]["pultrusion"]["status"], "Warning");
    assert_eq!(json["data"]["stranding"]["status"], "Normal");
}

#[tokio::test]
async fn test_pushed_status_strings_are_recomputed() {
    let state = make_test_state();

    let mut body = upload_body(85.0);
    body["pultrusion"]["status"] = json!("WARN");
    let response = build_router(Arc::clone(&state))
        .oneshot(post_upload(&body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = build_router(state)
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"]["pultrusion"]["status"], "Normal");
}

#[tokio::test]
async fn test_upload_missing_process_is_rejected() {
    let router = build_router(make_test_state());

    let mut body = upload_body(85.0);
    body.as_object_mut().unwrap().remove("stranding");

    let response = router.oneshot(post_upload(&body)).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_rejected_upload_leaves_store_untouched() {
    let state = make_test_state();

    let response = build_router(Arc::clone(&state))
        .oneshot(post_upload(&upload_body(85.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A malformed follow-up must not clobber the accepted snapshot.
    let mut bad = upload_body(99.0);
    bad.as_object_mut().unwrap().remove("conforming");
    let response = build_router(Arc::clone(&state))
        .oneshot(post_upload(&bad))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let response = build_router(state)
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"]["pultrusion"]["die_temp"], 85.0);
}

#[tokio::test]
async fn test_non_finite_value_is_rejected() {
    let router = build_router(make_test_state());

    // 1e999 overflows f64 parsing; whether it surfaces as a deserialization
    // rejection or a finiteness validation error, the result is a 4xx and
    // an untouched store.
    let raw = upload_body(85.0)
        .to_string()
        .replace("85.0", "1e999");
    let request = Request::post("/api/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_history_without_table_store_returns_503() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::get("/api/history?process=pultrusion&metric=die_temp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_history_unknown_process_is_rejected() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::get("/api/history?process=extrusion&metric=die_temp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_image_blob_passes_through() {
    let state = make_test_state();

    let mut body = upload_body(85.0);
    body["image_base64"] = json!("aGVsbG8=");
    let response = build_router(Arc::clone(&state))
        .oneshot(post_upload(&body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = build_router(state)
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"]["image_base64"], "aGVsbG8=");
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::get("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
