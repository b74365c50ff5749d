//! Record types held by the event index and the kind abstraction that
//! lets one code path serve scalars, images and audio.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::index::EventIndex;

/// MIME type used for every image data URI.
pub const IMAGE_CONTENT_TYPE: &str = "image/png";

/// The three tag namespaces exposed by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// Scalar summaries (`simple_value`).
    Scalars,
    /// Encoded image summaries.
    Images,
    /// Encoded audio summaries.
    Audio,
}

impl TagKind {
    /// Returns the canonical lowercase label for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scalars => "scalars",
            Self::Images => "images",
            Self::Audio => "audio",
        }
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TagKind {
    type Err = ParseTagKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scalars" => Ok(Self::Scalars),
            "images" => Ok(Self::Images),
            "audio" => Ok(Self::Audio),
            _ => Err(ParseTagKindError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown tag kind string.
#[derive(Debug, Clone)]
pub struct ParseTagKindError(pub String);

impl std::fmt::Display for ParseTagKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown tag kind: {}", self.0)
    }
}

impl std::error::Error for ParseTagKindError {}

/// One scalar summary value.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarRecord {
    /// Training step the value was logged at.
    pub step: i64,
    /// Seconds since the Unix epoch when the event was written.
    pub wall_time: f64,
    /// The logged value.
    pub value: f64,
}

/// One encoded image summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub step: i64,
    pub wall_time: f64,
    pub width: i32,
    pub height: i32,
    /// Encoded image bytes, as written by the producer.
    pub encoded: Vec<u8>,
}

impl ImageRecord {
    /// Encodes the image as a `data:image/png;base64,...` URI.
    pub fn data_uri(&self) -> String {
        data_uri(IMAGE_CONTENT_TYPE, &self.encoded)
    }
}

/// One encoded audio clip.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioRecord {
    pub step: i64,
    pub wall_time: f64,
    /// Samples per second.
    pub sample_rate: f32,
    /// Number of frames per channel.
    pub length_frames: i64,
    pub num_channels: i64,
    /// MIME type of `encoded`, e.g. `audio/wav`.
    pub content_type: String,
    pub encoded: Vec<u8>,
}

impl AudioRecord {
    /// Encodes the clip as a data URI using the record's own content type.
    pub fn data_uri(&self) -> String {
        data_uri(&self.content_type, &self.encoded)
    }
}

fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// A record type stored per tag in the [`EventIndex`].
///
/// Each kind addresses its own tag namespace, so a single generic lookup
/// serves every kind.
pub trait RecordKind: Send + Sync + Sized + 'static {
    /// The tag namespace this record type lives in.
    const KIND: TagKind;

    /// The per-tag series for this kind.
    fn series(index: &EventIndex) -> &BTreeMap<String, Vec<Arc<Self>>>;

    /// Mutable access to the per-tag series for this kind.
    fn series_mut(index: &mut EventIndex) -> &mut BTreeMap<String, Vec<Arc<Self>>>;
}

impl RecordKind for ScalarRecord {
    const KIND: TagKind = TagKind::Scalars;

    fn series(index: &EventIndex) -> &BTreeMap<String, Vec<Arc<Self>>> {
        &index.scalars
    }

    fn series_mut(index: &mut EventIndex) -> &mut BTreeMap<String, Vec<Arc<Self>>> {
        &mut index.scalars
    }
}

impl RecordKind for ImageRecord {
    const KIND: TagKind = TagKind::Images;

    fn series(index: &EventIndex) -> &BTreeMap<String, Vec<Arc<Self>>> {
        &index.images
    }

    fn series_mut(index: &mut EventIndex) -> &mut BTreeMap<String, Vec<Arc<Self>>> {
        &mut index.images
    }
}

impl RecordKind for AudioRecord {
    const KIND: TagKind = TagKind::Audio;

    fn series(index: &EventIndex) -> &BTreeMap<String, Vec<Arc<Self>>> {
        &index.audio
    }

    fn series_mut(index: &mut EventIndex) -> &mut BTreeMap<String, Vec<Arc<Self>>> {
        &mut index.audio
    }
}
