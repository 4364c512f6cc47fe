//! Integration tests for the playback session routes.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use stardust_test_support::ManualSpeechBackend;
use uuid::Uuid;

#[tokio::test]
async fn test_start_playback_returns_201_with_initial_snapshot() {
    let app = common::build_test_app();

    let (status, json) = common::post_json(
        &app.router,
        "/api/v1/playback",
        &serde_json::json!({ "story_slug": "demo" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["session_id"].is_string());
    let snapshot = &json["snapshot"];
    assert_eq!(snapshot["scene_index"], 0);
    assert_eq!(snapshot["scene_number"], 1);
    assert_eq!(snapshot["scene_count"], 3);
    assert_eq!(snapshot["is_playing"], false);
    assert_eq!(snapshot["is_muted"], false);
    assert_eq!(snapshot["progress_fraction"], 0.0);
    assert_eq!(snapshot["has_previous"], false);
    assert_eq!(snapshot["has_next"], true);
    assert_eq!(snapshot["story_title"], "Luna's Mars Adventure");
    assert!(snapshot["scene"]["narrationText"].is_string());
    assert_eq!(app.state.sessions.len(), 1);
}

#[tokio::test]
async fn test_start_playback_with_inline_story() {
    let app = common::build_test_app();
    let story = serde_json::json!({
        "storyTitle": "Moon Nap",
        "ageRange": "2-4 years",
        "estimatedReadTimeSeconds": 40,
        "scenes": [
            { "title": "Yawn", "narrationText": "The moon yawned." },
            { "title": "Sleep", "narrationText": "The moon slept." }
        ]
    });

    let (status, json) = common::post_json(
        &app.router,
        "/api/v1/playback",
        &serde_json::json!({ "story": story, "voice_style": "cheerful" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["snapshot"]["story_title"], "Moon Nap");
    assert_eq!(json["snapshot"]["scene_count"], 2);
}

#[tokio::test]
async fn test_start_playback_rejects_story_without_scenes() {
    let app = common::build_test_app();

    let (status, json) = common::post_json(
        &app.router,
        "/api/v1/playback",
        &serde_json::json!({ "story": { "title": "Empty", "scenes": [] } }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_start_playback_requires_exactly_one_story_source() {
    let app = common::build_test_app();

    let (status, json) =
        common::post_json(&app.router, "/api/v1/playback", &serde_json::json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_start_playback_with_unknown_slug_returns_404() {
    let app = common::build_test_app();

    let (status, json) = common::post_json(
        &app.router,
        "/api/v1/playback",
        &serde_json::json!({ "story_slug": "dragons" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "story_not_found");
}

#[tokio::test(start_paused = true)]
async fn test_play_complete_and_auto_advance_round_trip() {
    // Arrange
    let app = common::build_test_app();
    let id = common::start_demo_session(&app.router).await;

    // Act
    let (status, json) =
        common::post_empty(&app.router, &format!("/api/v1/playback/{id}/toggle-playback")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");
    assert!(json.get("reason").is_none());
    assert_eq!(json["snapshot"]["is_playing"], true);

    // Act
    app.backend.wait_for_requests(1).await;
    app.backend.finish_current();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let (status, json) = common::get_json(&app.router, &format!("/api/v1/playback/{id}")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["scene_index"], 1);
    assert_eq!(json["is_playing"], false);
    let progress = json["progress_fraction"].as_f64().unwrap();
    assert!((progress - 2.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_prev_scene_progress_uses_landing_index() {
    let app = common::build_test_app();
    let id = common::start_demo_session(&app.router).await;

    common::post_empty(&app.router, &format!("/api/v1/playback/{id}/next-scene")).await;
    common::post_empty(&app.router, &format!("/api/v1/playback/{id}/next-scene")).await;
    let (status, json) =
        common::post_empty(&app.router, &format!("/api/v1/playback/{id}/prev-scene")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["snapshot"]["scene_index"], 1);
    let progress = json["snapshot"]["progress_fraction"].as_f64().unwrap();
    assert!((progress - 1.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_next_scene_at_last_scene_is_reported_as_ignored() {
    let app = common::build_test_app();
    let id = common::start_demo_session(&app.router).await;
    let uri = format!("/api/v1/playback/{id}/next-scene");

    common::post_empty(&app.router, &uri).await;
    common::post_empty(&app.router, &uri).await;
    let (status, json) = common::post_empty(&app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "ignored");
    assert_eq!(json["reason"], "at_last_scene");
    assert_eq!(json["snapshot"]["scene_index"], 2);
    assert_eq!(json["snapshot"]["is_last_scene"], true);
}

#[tokio::test]
async fn test_toggle_mute_while_playing_interrupts_narration() {
    // Arrange
    let app = common::build_test_app();
    let id = common::start_demo_session(&app.router).await;
    common::post_empty(&app.router, &format!("/api/v1/playback/{id}/toggle-playback")).await;
    app.backend.wait_for_requests(1).await;

    // Act
    let (_, json) =
        common::post_empty(&app.router, &format!("/api/v1/playback/{id}/toggle-mute")).await;
    common::post_empty(&app.router, &format!("/api/v1/playback/{id}/toggle-playback")).await;
    app.backend.wait_for_requests(2).await;

    // Assert
    assert_eq!(json["snapshot"]["is_playing"], false);
    assert_eq!(json["snapshot"]["is_muted"], true);
    assert!(app.backend.requests()[1].voice.volume.abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_events_endpoint_returns_journal() {
    let app = common::build_test_app();
    let id = common::start_demo_session(&app.router).await;
    common::post_empty(&app.router, &format!("/api/v1/playback/{id}/next-scene")).await;
    common::post_empty(&app.router, &format!("/api/v1/playback/{id}/toggle-mute")).await;

    let (status, json) =
        common::get_json(&app.router, &format!("/api/v1/playback/{id}/events")).await;

    assert_eq!(status, StatusCode::OK);
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["metadata"]["event_type"], "playback.scene_changed");
    assert_eq!(events[0]["metadata"]["sequence_number"], 1);
    assert_eq!(events[0]["kind"]["type"], "scene_changed");
    assert_eq!(events[1]["kind"]["type"], "mute_toggled");
    assert_eq!(events[1]["kind"]["muted"], true);
}

#[tokio::test]
async fn test_delete_ends_session() {
    let app = common::build_test_app();
    let id = common::start_demo_session(&app.router).await;

    let status = common::delete(&app.router, &format!("/api/v1/playback/{id}")).await;
    let (after, json) = common::get_json(&app.router, &format!("/api/v1/playback/{id}")).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(after, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "session_not_found");
    assert!(app.state.sessions.is_empty());
}

#[tokio::test]
async fn test_unknown_session_returns_404() {
    let app = common::build_test_app();
    let id = Uuid::new_v4();

    let (status, json) =
        common::post_empty(&app.router, &format!("/api/v1/playback/{id}/next-scene")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "session_not_found");
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_speech_still_advances_silently() {
    // Arrange
    let app = common::build_test_app_with(ManualSpeechBackend::unavailable());
    let id = common::start_demo_session(&app.router).await;

    // Act
    common::post_empty(&app.router, &format!("/api/v1/playback/{id}/toggle-playback")).await;
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let (_, json) = common::get_json(&app.router, &format!("/api/v1/playback/{id}")).await;

    // Assert
    assert_eq!(json["scene_index"], 1);
    assert_eq!(json["is_playing"], false);
    assert!(app.backend.requests().is_empty());
}
