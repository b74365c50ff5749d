use atb_events::{AudioRecord, EventStore, EventWriter, ImageRecord};
use atb_server::{app, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];
const WAV_BYTES: &[u8] = b"RIFF\x00\x00\x00\x00WAVE";

fn media_app() -> (tempfile::TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.out.tfevents.1700000000.trainer");
    let mut writer = EventWriter::create(&path, 1_700_000_000.0).unwrap();
    writer
        .add_image(
            "samples/generated",
            &ImageRecord {
                step: 5,
                wall_time: 1_700_000_005.0,
                width: 2,
                height: 1,
                encoded: PNG_MAGIC.to_vec(),
            },
        )
        .unwrap();
    for step in [1, 2] {
        writer
            .add_audio(
                "speech/eval/clip",
                &AudioRecord {
                    step,
                    wall_time: 1_700_000_000.0 + step as f64,
                    sample_rate: 16_000.0,
                    length_frames: 4,
                    num_channels: 1,
                    content_type: "audio/wav".to_string(),
                    encoded: WAV_BYTES.to_vec(),
                },
            )
            .unwrap();
    }
    writer.flush().unwrap();

    let store = EventStore::initialize(dir.path()).unwrap();
    (dir, app(AppState::new(Arc::new(store))))
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
async fn images_endpoint_inlines_png_data() {
    let (_dir, app) = media_app();

    let (status, json) = get_json(app, "/api/images/samples/generated").await;

    assert_eq!(status, StatusCode::OK);
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["step"], 5);
    assert_eq!(entries[0]["width"], 2);
    assert_eq!(entries[0]["height"], 1);
    assert_eq!(entries[0]["data"], "data:image/png;base64,iVBORw==");
}

#[tokio::test]
async fn audio_endpoint_uses_record_content_type() {
    let (_dir, app) = media_app();

    let (status, json) = get_json(app, "/api/audio/speech/eval/clip").await;

    assert_eq!(status, StatusCode::OK);
    let entries = json.as_array().unwrap();
    let steps: Vec<i64> = entries.iter().map(|e| e["step"].as_i64().unwrap()).collect();
    assert_eq!(steps, vec![1, 2]);
    assert_eq!(entries[0]["sample_rate"], 16_000.0);
    assert_eq!(entries[0]["length_frames"], 4);
    assert_eq!(entries[0]["content_type"], "audio/wav");
    assert!(entries[0]["data"]
        .as_str()
        .unwrap()
        .starts_with("data:audio/wav;base64,"));
}

#[tokio::test]
async fn percent_encoded_tag_segments_are_decoded() {
    let (_dir, app) = media_app();

    let (status, json) = get_json(app, "/api/audio/speech/eval%2Fclip").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_image_tag_is_a_json_500() {
    let (_dir, app) = media_app();

    let (status, json) = get_json(app, "/api/images/speech/eval/clip").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("speech/eval/clip"));
}
