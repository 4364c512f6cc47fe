//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use stardust_api::state::AppState;
use stardust_playback::application::controller::PlaybackConfig;
use stardust_playback::application::registry::SessionRegistry;
use stardust_story::application::catalog::StoryCatalog;
use stardust_test_support::{FixedClock, ManualSpeechBackend};
use tower::ServiceExt;

/// Router plus the speech double behind it.
pub struct TestApp {
    pub router: Router,
    pub backend: Arc<ManualSpeechBackend>,
    pub state: AppState,
}

/// Build the full app router over the demo catalog, a manual speech backend,
/// and a fixed clock. Uses the same route structure as `main.rs`.
pub fn build_test_app() -> TestApp {
    build_test_app_with(ManualSpeechBackend::new())
}

/// Same as [`build_test_app`] with a specific speech backend.
pub fn build_test_app_with(backend: ManualSpeechBackend) -> TestApp {
    let backend = Arc::new(backend);
    let sessions = SessionRegistry::new(
        backend.clone(),
        Arc::new(FixedClock::default()),
        PlaybackConfig {
            settle_delay: Duration::from_secs(1),
            ..PlaybackConfig::default()
        },
    );
    let state = AppState::new(StoryCatalog::with_demo(), sessions);
    TestApp {
        router: stardust_api::build_router(state.clone()),
        backend,
        state,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a DELETE request and return the status.
pub async fn delete(app: &Router, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await.0
}

/// Start a demo playback session and return its ID.
pub async fn start_demo_session(app: &Router) -> String {
    let (status, json) = post_json(
        app,
        "/api/v1/playback",
        &serde_json::json!({ "story_slug": "demo" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["session_id"].as_str().unwrap().to_owned()
}
