//! Integration tests for dfd-dash API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - POST /api/check validation and background detection
//! - POST /api/navigate and GET /api/state
//! - POST /api/cancel
//! - Snapshot endpoints (results, analytics, logs, charts)
//! - GET /events framing

mod helpers;

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use dfd_common::events::DashEvent;
use dfd_common::Verdict;
use dfd_dash::{build_router, AppState, Dashboard};
use futures::StreamExt;
use helpers::{create_dashboard, MockClassifier, Reply};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: Create app over `dashboard`
fn setup_app(dashboard: &Dashboard) -> axum::Router {
    build_router(AppState::new(dashboard.clone()))
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: Wait for the first event matching `pred`
async fn wait_for_event(
    rx: &mut tokio::sync::broadcast::Receiver<DashEvent>,
    pred: impl Fn(&DashEvent) -> bool,
) -> DashEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.expect("Event bus closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("Timed out waiting for event")
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (dashboard, _) = create_dashboard(MockClassifier::new());
    let app = setup_app(&dashboard);

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "dfd-dash");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
    assert_eq!(body["in_flight"], 0);
}

#[tokio::test]
async fn test_health_reports_last_detection_failure() {
    let (dashboard, _) = create_dashboard(MockClassifier::new());
    let mut rx = dashboard.event_bus().subscribe();

    let response = setup_app(&dashboard).oneshot(get_request("/health")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["last_error"].is_null());

    setup_app(&dashboard)
        .oneshot(post_json("/api/check", json!({ "image": "img/none.png", "image_id": "none" })))
        .await
        .unwrap();
    wait_for_event(&mut rx, |e| matches!(e, DashEvent::DetectionFailed { .. })).await;

    let response = setup_app(&dashboard).oneshot(get_request("/health")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    let last_error = body["last_error"].as_str().expect("last_error should be set");
    assert!(last_error.starts_with("Error checking none:"));
}

// =============================================================================
// Check
// =============================================================================

#[tokio::test]
async fn test_check_runs_detection_in_background() {
    let classifier =
        MockClassifier::new().verdict("img/a.png", Verdict::new("fake", 0.97, 0.97, 0.03));
    let (dashboard, _) = create_dashboard(classifier);
    let mut rx = dashboard.event_bus().subscribe();

    let response = setup_app(&dashboard)
        .oneshot(post_json("/api/check", json!({ "image": "img/a.png", "image_id": "a" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    wait_for_event(&mut rx, |e| matches!(e, DashEvent::DetectionCompleted { .. })).await;

    let response = setup_app(&dashboard).oneshot(get_request("/api/results/a")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["image_id"], "a");
    assert_eq!(body["verdict"]["predicted_label"], "fake");

    let response = setup_app(&dashboard).oneshot(get_request("/api/analytics")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    assert_eq!(body["rows"][0]["confidence"], "97.00");
    assert_eq!(body["summary"]["fake"], 1);

    let response = setup_app(&dashboard)
        .oneshot(get_request("/api/charts/analyticsBarChart"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["kind"], "bar");
    assert_eq!(body["labels"], json!(["a"]));
}

#[tokio::test]
async fn test_check_rejects_empty_fields() {
    let (dashboard, _) = create_dashboard(MockClassifier::new());

    let response = setup_app(&dashboard)
        .oneshot(post_json("/api/check", json!({ "image": "", "image_id": "a" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let response = setup_app(&dashboard)
        .oneshot(post_json("/api/check", json!({ "image": "img/a.png", "image_id": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_check_logged() {
    let (dashboard, _) = create_dashboard(MockClassifier::new());
    let mut rx = dashboard.event_bus().subscribe();

    let response = setup_app(&dashboard)
        .oneshot(post_json("/api/check", json!({ "image": "img/none.png", "image_id": "none" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    wait_for_event(&mut rx, |e| matches!(e, DashEvent::DetectionFailed { .. })).await;

    let response = setup_app(&dashboard).oneshot(get_request("/api/logs")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    let lines = body["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].as_str().unwrap().contains("Error checking none:"));
    assert_eq!(body["scroll_position"], 0);

    let response = setup_app(&dashboard).oneshot(get_request("/api/results/none")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Navigation and state
// =============================================================================

#[tokio::test]
async fn test_initial_state() {
    let (dashboard, _) = create_dashboard(MockClassifier::new());

    let response = setup_app(&dashboard).oneshot(get_request("/api/state")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["active_panel"], "results");
    assert_eq!(body["overlay"]["state"], "Hidden");
    assert_eq!(body["in_flight"], 0);
}

#[tokio::test]
async fn test_navigate_accepted_and_activates() {
    let (dashboard, _) = create_dashboard(MockClassifier::new());
    let mut rx = dashboard.event_bus().subscribe();

    let response = setup_app(&dashboard)
        .oneshot(post_json("/api/navigate", json!({ "target": "analytics" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let event = wait_for_event(&mut rx, |e| matches!(e, DashEvent::PanelActivated { .. })).await;
    if let DashEvent::PanelActivated { panel, .. } = event {
        assert_eq!(panel, "analytics");
    }

    let response = setup_app(&dashboard).oneshot(get_request("/api/state")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["active_panel"], "analytics");
}

#[tokio::test]
async fn test_unknown_chart_surface_not_found() {
    let (dashboard, _) = create_dashboard(MockClassifier::new());
    let response = setup_app(&dashboard)
        .oneshot(get_request("/api/charts/accuracyChart"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_cancel_without_requests() {
    let (dashboard, _) = create_dashboard(MockClassifier::new());
    let response = setup_app(&dashboard)
        .oneshot(post_json("/api/cancel", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["cancelled"], 0);
}

#[tokio::test]
async fn test_cancel_single_image_in_flight() {
    let classifier = MockClassifier::new()
        .reply(
            "img/a.png",
            Duration::from_secs(30),
            Reply::Verdict(Verdict::new("fake", 0.9, 0.9, 0.1)),
        )
        .reply(
            "img/b.png",
            Duration::from_secs(30),
            Reply::Verdict(Verdict::new("real", 0.2, 0.2, 0.8)),
        );
    let (dashboard, _) = create_dashboard(classifier);
    let mut rx = dashboard.event_bus().subscribe();

    for (image, id) in [("img/a.png", "a"), ("img/b.png", "b")] {
        let response = setup_app(&dashboard)
            .oneshot(post_json("/api/check", json!({ "image": image, "image_id": id })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
    wait_for_event(&mut rx, |e| matches!(e, DashEvent::DetectionStarted { image_id, .. } if image_id == "a")).await;
    wait_for_event(&mut rx, |e| matches!(e, DashEvent::DetectionStarted { image_id, .. } if image_id == "b")).await;

    let response = setup_app(&dashboard)
        .oneshot(post_json("/api/cancel", json!({ "image_id": "a" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["cancelled"], 1);

    let event = wait_for_event(&mut rx, |e| matches!(e, DashEvent::DetectionFailed { .. })).await;
    if let DashEvent::DetectionFailed { image_id, .. } = event {
        assert_eq!(image_id, "a");
    }

    let response = setup_app(&dashboard).oneshot(get_request("/api/state")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["in_flight"], 1);

    assert_eq!(dashboard.cancel_all().await, 1);
}

#[tokio::test]
async fn test_results_listed_by_image_id() {
    let classifier = MockClassifier::new()
        .verdict("img/b.png", Verdict::new("real", 0.1, 0.1, 0.9))
        .verdict("img/a.png", Verdict::new("fake", 0.8, 0.8, 0.2));
    let (dashboard, _) = create_dashboard(classifier);
    let mut rx = dashboard.event_bus().subscribe();

    for (image, id) in [("img/b.png", "b"), ("img/a.png", "a")] {
        setup_app(&dashboard)
            .oneshot(post_json("/api/check", json!({ "image": image, "image_id": id })))
            .await
            .unwrap();
        wait_for_event(&mut rx, |e| {
            matches!(e, DashEvent::DetectionCompleted { image_id, .. } if image_id == id)
        })
        .await;
    }

    let response = setup_app(&dashboard).oneshot(get_request("/api/results")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["image_id"], "a");
    assert_eq!(entries[0]["verdict"]["predicted_label"], "fake");
    assert_eq!(entries[1]["image_id"], "b");
    assert_eq!(entries[1]["verdict"]["predicted_label"], "real");
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn test_event_stream_frames_named_events() {
    let (dashboard, _) = create_dashboard(MockClassifier::new());

    let response = setup_app(&dashboard).oneshot(get_request("/events")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"));

    // Handler has subscribed by the time the response exists
    dashboard.spawn_navigate("analytics".to_string());

    let mut frames = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(Duration::from_secs(5), async {
        let mut buffer = String::new();
        loop {
            let chunk = frames.next().await.expect("Stream ended").expect("Body error");
            buffer.push_str(&String::from_utf8_lossy(&chunk));
            while let Some(end) = buffer.find("\n\n") {
                let frame: String = buffer.drain(..end + 2).collect();
                if frame.contains("event: PanelActivated") {
                    return frame;
                }
            }
        }
    })
    .await
    .expect("Timed out waiting for PanelActivated frame");

    let data = frame
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("Frame should carry data");
    let event: Value = serde_json::from_str(data).expect("Data should be JSON");
    assert_eq!(event["type"], "PanelActivated");
    assert_eq!(event["panel"], "analytics");
}
