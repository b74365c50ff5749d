use atb_events::{EventStore, EventWriter, ScalarRecord};
use atb_server::{app, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

fn write_loss_log(dir: &Path) {
    let path = dir.join("events.out.tfevents.1700000000.trainer");
    let mut writer = EventWriter::create(&path, 1_700_000_000.0).unwrap();
    for (step, value) in [(0, 1.0), (10, 0.5), (20, 0.25)] {
        writer
            .add_scalar(
                "loss",
                &ScalarRecord {
                    step,
                    wall_time: 1_700_000_000.0 + step as f64,
                    value,
                },
            )
            .unwrap();
    }
    writer.flush().unwrap();
}

fn app_for(dir: &Path) -> axum::Router {
    let store = EventStore::initialize(dir).unwrap();
    app(AppState::new(Arc::new(store)))
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn scalars_endpoint_returns_parallel_arrays() {
    let dir = tempfile::tempdir().unwrap();
    write_loss_log(dir.path());

    let (status, json) = get_json(app_for(dir.path()), "/api/scalars/loss").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["steps"], serde_json::json!([0, 10, 20]));
    assert_eq!(json["values"], serde_json::json!([1.0, 0.5, 0.25]));
    assert_eq!(
        json["wall_times"],
        serde_json::json!([1_700_000_000.0, 1_700_000_010.0, 1_700_000_020.0])
    );
}

#[tokio::test]
async fn non_finite_values_are_labelled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.out.tfevents.1700000000.trainer");
    let mut writer = EventWriter::create(&path, 1_700_000_000.0).unwrap();
    for (step, value) in [
        (0, 2.0),
        (1, f64::NAN),
        (2, f64::INFINITY),
        (3, f64::NEG_INFINITY),
    ] {
        writer
            .add_scalar(
                "loss",
                &ScalarRecord {
                    step,
                    wall_time: 1_700_000_000.0,
                    value,
                },
            )
            .unwrap();
    }
    writer.flush().unwrap();

    let (status, json) = get_json(app_for(dir.path()), "/api/scalars/loss").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["values"],
        serde_json::json!([2.0, "NaN", "Infinity", "-Infinity"])
    );
}

#[tokio::test]
async fn unknown_scalar_tag_is_a_json_500() {
    let dir = tempfile::tempdir().unwrap();
    write_loss_log(dir.path());

    let (status, json) = get_json(app_for(dir.path()), "/api/scalars/accuracy").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("accuracy"), "unexpected error: {message}");
}

#[tokio::test]
async fn scalar_tag_in_another_namespace_is_unknown() {
    let dir = tempfile::tempdir().unwrap();
    write_loss_log(dir.path());

    let (status, json) = get_json(app_for(dir.path()), "/api/audio/loss").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn missing_store_is_a_json_500() {
    let (status, json) = get_json(app(AppState::without_store()), "/api/scalars/loss").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "event store is not initialized");
}

#[tokio::test]
async fn reload_is_visible_through_the_api() {
    let dir = tempfile::tempdir().unwrap();
    write_loss_log(dir.path());
    let store = Arc::new(EventStore::initialize(dir.path()).unwrap());

    let mut writer = EventWriter::append(store.source().event_file()).unwrap();
    writer
        .add_scalar(
            "loss",
            &ScalarRecord {
                step: 30,
                wall_time: 1_700_000_030.0,
                value: 0.125,
            },
        )
        .unwrap();
    writer.flush().unwrap();
    assert_eq!(store.reload(), 1);

    let (status, json) = get_json(app(AppState::new(store)), "/api/scalars/loss").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["steps"], serde_json::json!([0, 10, 20, 30]));
}
