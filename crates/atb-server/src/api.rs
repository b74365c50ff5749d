//! JSON API handlers for tag data.
//!
//! Provides:
//! - `GET /api/scalars/{*tag}`: a scalar series as parallel arrays
//! - `GET /api/images/{*tag}`: image records with inline PNG data URIs
//! - `GET /api/audio/{*tag}`: audio records with inline data URIs
//! - `GET /api/tags`: tag names per kind and the log format version
//!
//! Every failure on these endpoints is reported as HTTP 500 with a JSON
//! `{"error": ...}` body.

use crate::AppState;
use atb_events::{
    AudioRecord, EventStore, EventsError, ImageRecord, RecordKind, ScalarRecord, TagSnapshot,
};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// API error type. All variants map to HTTP 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("event store is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Events(#[from] EventsError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "api request failed");

        let body = Json(serde_json::json!({
            "error": self.to_string()
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Response body for `GET /api/scalars/{*tag}`.
///
/// Non-finite values are sent as the strings `"NaN"`, `"Infinity"` and
/// `"-Infinity"`, since JSON has no literal for them.
#[derive(Debug, Serialize)]
pub struct ScalarSeries {
    pub steps: Vec<i64>,
    #[serde(serialize_with = "serialize_scalar_values")]
    pub values: Vec<f64>,
    pub wall_times: Vec<f64>,
}

fn serialize_scalar_values<S: Serializer>(
    values: &[f64],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for &value in values {
        if value.is_finite() {
            seq.serialize_element(&value)?;
        } else if value.is_nan() {
            seq.serialize_element("NaN")?;
        } else if value > 0.0 {
            seq.serialize_element("Infinity")?;
        } else {
            seq.serialize_element("-Infinity")?;
        }
    }
    seq.end()
}

/// One element of the `GET /api/images/{*tag}` response.
#[derive(Debug, Serialize)]
pub struct ImageEntry {
    pub step: i64,
    pub wall_time: f64,
    pub width: i32,
    pub height: i32,
    /// `data:image/png;base64,...`
    pub data: String,
}

/// One element of the `GET /api/audio/{*tag}` response.
#[derive(Debug, Serialize)]
pub struct AudioEntry {
    pub step: i64,
    pub wall_time: f64,
    pub sample_rate: f32,
    pub length_frames: i64,
    pub content_type: String,
    /// `data:<content_type>;base64,...`
    pub data: String,
}

/// Response body for `GET /api/tags`.
#[derive(Debug, Serialize)]
pub struct TagsResponse {
    #[serde(flatten)]
    pub tags: TagSnapshot,
    pub format_version: String,
}

/// How a record kind is rendered as a JSON response body.
pub trait RecordView: RecordKind {
    type Body: Serialize + Send;

    fn render(records: &[Arc<Self>]) -> Self::Body;
}

impl RecordView for ScalarRecord {
    type Body = ScalarSeries;

    fn render(records: &[Arc<Self>]) -> ScalarSeries {
        ScalarSeries {
            steps: records.iter().map(|r| r.step).collect(),
            values: records.iter().map(|r| r.value).collect(),
            wall_times: records.iter().map(|r| r.wall_time).collect(),
        }
    }
}

impl RecordView for ImageRecord {
    type Body = Vec<ImageEntry>;

    fn render(records: &[Arc<Self>]) -> Vec<ImageEntry> {
        records
            .iter()
            .map(|r| ImageEntry {
                step: r.step,
                wall_time: r.wall_time,
                width: r.width,
                height: r.height,
                data: r.data_uri(),
            })
            .collect()
    }
}

impl RecordView for AudioRecord {
    type Body = Vec<AudioEntry>;

    fn render(records: &[Arc<Self>]) -> Vec<AudioEntry> {
        records
            .iter()
            .map(|r| AudioEntry {
                step: r.step,
                wall_time: r.wall_time,
                sample_rate: r.sample_rate,
                length_frames: r.length_frames,
                content_type: r.content_type.clone(),
                data: r.data_uri(),
            })
            .collect()
    }
}

fn require_store(state: &AppState) -> Result<&Arc<EventStore>, ApiError> {
    state.store().ok_or(ApiError::NotInitialized)
}

/// Handler for `GET /api/{scalars,images,audio}/{*tag}`.
///
/// The record kind is chosen by the route; the tag may contain `/`.
pub async fn tag_records_handler<R: RecordView>(
    Extension(state): Extension<Arc<AppState>>,
    Path(tag): Path<String>,
) -> Result<Json<R::Body>, ApiError> {
    let store = require_store(&state)?;
    let records = store.records::<R>(&tag)?;
    Ok(Json(R::render(&records)))
}

/// Handler for `GET /api/tags`.
pub async fn get_tags_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<TagsResponse>, ApiError> {
    let store = require_store(&state)?;
    Ok(Json(TagsResponse {
        tags: store.tags(),
        format_version: store.format_version(),
    }))
}
