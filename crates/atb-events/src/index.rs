//! The in-memory tag index built from decoded events.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use crate::proto::{self, summary};
use crate::record::{AudioRecord, ImageRecord, RecordKind, ScalarRecord, TagKind};

/// Per-kind record series keyed by tag, plus log metadata.
///
/// The index only ever grows: updates append to the end of a tag's series
/// and nothing is removed.
#[derive(Debug, Default)]
pub struct EventIndex {
    pub(crate) scalars: BTreeMap<String, Vec<Arc<ScalarRecord>>>,
    pub(crate) images: BTreeMap<String, Vec<Arc<ImageRecord>>>,
    pub(crate) audio: BTreeMap<String, Vec<Arc<AudioRecord>>>,
    pub(crate) file_version: Option<String>,
}

/// Sorted tag names per kind at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagSnapshot {
    pub scalars: BTreeSet<String>,
    pub images: BTreeSet<String>,
    pub audio: BTreeSet<String>,
}

impl TagSnapshot {
    /// Tag names for a single kind.
    pub fn of(&self, kind: TagKind) -> &BTreeSet<String> {
        match kind {
            TagKind::Scalars => &self.scalars,
            TagKind::Images => &self.images,
            TagKind::Audio => &self.audio,
        }
    }
}

/// A single change to the index decoded from an event.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Update {
    FileVersion(String),
    Scalar(String, ScalarRecord),
    Image(String, ImageRecord),
    Audio(String, AudioRecord),
}

impl EventIndex {
    pub fn tags(&self) -> TagSnapshot {
        TagSnapshot {
            scalars: self.scalars.keys().cloned().collect(),
            images: self.images.keys().cloned().collect(),
            audio: self.audio.keys().cloned().collect(),
        }
    }

    pub fn file_version(&self) -> Option<&str> {
        self.file_version.as_deref()
    }

    /// Total number of records across all kinds and tags.
    pub fn record_count(&self) -> usize {
        fn total<R>(series: &BTreeMap<String, Vec<Arc<R>>>) -> usize {
            series.values().map(Vec::len).sum()
        }
        total(&self.scalars) + total(&self.images) + total(&self.audio)
    }

    /// The stored series for `tag`, or `None` if the tag is unknown for `R`.
    pub fn series<R: RecordKind>(&self, tag: &str) -> Option<&[Arc<R>]> {
        R::series(self).get(tag).map(Vec::as_slice)
    }

    /// Applies a batch of updates in order and returns how many records
    /// were appended.
    pub(crate) fn apply(&mut self, updates: Vec<Update>) -> usize {
        let mut appended = 0;
        for update in updates {
            match update {
                Update::FileVersion(version) => {
                    self.file_version.get_or_insert(version);
                }
                Update::Scalar(tag, record) => {
                    self.push(tag, record);
                    appended += 1;
                }
                Update::Image(tag, record) => {
                    self.push(tag, record);
                    appended += 1;
                }
                Update::Audio(tag, record) => {
                    self.push(tag, record);
                    appended += 1;
                }
            }
        }
        appended
    }

    fn push<R: RecordKind>(&mut self, tag: String, record: R) {
        R::series_mut(self)
            .entry(tag)
            .or_default()
            .push(Arc::new(record));
    }
}

/// Extracts the index updates carried by one event.
///
/// Summary values that are not scalars, images or audio are dropped.
pub(crate) fn updates_from_event(event: proto::Event) -> Vec<Update> {
    let proto::Event {
        wall_time,
        step,
        what,
    } = event;

    match what {
        Some(proto::event::What::FileVersion(version)) => vec![Update::FileVersion(version)],
        Some(proto::event::What::Summary(summary)) => summary
            .value
            .into_iter()
            .filter_map(|value| update_from_value(value, step, wall_time))
            .collect(),
        Some(proto::event::What::GraphDef(_)) | None => Vec::new(),
    }
}

fn update_from_value(value: summary::Value, step: i64, wall_time: f64) -> Option<Update> {
    // Very old writers only filled in `node_name`.
    let tag = if value.tag.is_empty() {
        value.node_name
    } else {
        value.tag
    };

    match value.value? {
        summary::value::Value::SimpleValue(v) => Some(Update::Scalar(
            tag,
            ScalarRecord {
                step,
                wall_time,
                value: f64::from(v),
            },
        )),
        summary::value::Value::Image(image) => Some(Update::Image(
            tag,
            ImageRecord {
                step,
                wall_time,
                width: image.width,
                height: image.height,
                encoded: image.encoded_image_string,
            },
        )),
        summary::value::Value::Audio(audio) => Some(Update::Audio(
            tag,
            AudioRecord {
                step,
                wall_time,
                sample_rate: audio.sample_rate,
                length_frames: audio.length_frames,
                num_channels: audio.num_channels,
                content_type: audio.content_type,
                encoded: audio.encoded_audio_string,
            },
        )),
    }
}
