//! Minimal event-file writer.
//!
//! Produces files in the same format training frameworks emit, which the
//! store can then read back. Used to build logs for tests and demos.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use prost::Message;

use crate::proto::{self, summary};
use crate::record::{AudioRecord, ImageRecord, ScalarRecord};
use crate::tfrecord::RecordWriter;

/// The `file_version` written at the head of new event files.
pub const FILE_VERSION: &str = "brain.Event:2";

/// Appends events to an event file.
#[derive(Debug)]
pub struct EventWriter<W: Write> {
    records: RecordWriter<W>,
}

impl EventWriter<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the file version header.
    pub fn create(path: impl AsRef<Path>, wall_time: f64) -> io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = Self::new(BufWriter::new(file));
        writer.write_file_version(FILE_VERSION, wall_time)?;
        Ok(writer)
    }

    /// Opens `path` for appending without writing a header.
    pub fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> EventWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            records: RecordWriter::new(inner),
        }
    }

    pub fn write_event(&mut self, event: &proto::Event) -> io::Result<()> {
        self.records.write_record(&event.encode_to_vec())
    }

    pub fn write_file_version(&mut self, version: &str, wall_time: f64) -> io::Result<()> {
        self.write_event(&proto::Event {
            wall_time,
            step: 0,
            what: Some(proto::event::What::FileVersion(version.to_string())),
        })
    }

    /// Writes a scalar summary. The value is narrowed to `f32` as on disk.
    pub fn add_scalar(&mut self, tag: &str, record: &ScalarRecord) -> io::Result<()> {
        self.write_value(
            tag,
            record.step,
            record.wall_time,
            summary::value::Value::SimpleValue(record.value as f32),
        )
    }

    pub fn add_image(&mut self, tag: &str, record: &ImageRecord) -> io::Result<()> {
        self.write_value(
            tag,
            record.step,
            record.wall_time,
            summary::value::Value::Image(summary::Image {
                height: record.height,
                width: record.width,
                colorspace: 0,
                encoded_image_string: record.encoded.clone(),
            }),
        )
    }

    pub fn add_audio(&mut self, tag: &str, record: &AudioRecord) -> io::Result<()> {
        self.write_value(
            tag,
            record.step,
            record.wall_time,
            summary::value::Value::Audio(summary::Audio {
                sample_rate: record.sample_rate,
                num_channels: record.num_channels,
                length_frames: record.length_frames,
                encoded_audio_string: record.encoded.clone(),
                content_type: record.content_type.clone(),
            }),
        )
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.records.flush()
    }

    pub fn into_inner(self) -> W {
        self.records.into_inner()
    }

    fn write_value(
        &mut self,
        tag: &str,
        step: i64,
        wall_time: f64,
        value: summary::value::Value,
    ) -> io::Result<()> {
        self.write_event(&proto::Event {
            wall_time,
            step,
            what: Some(proto::event::What::Summary(proto::Summary {
                value: vec![summary::Value {
                    node_name: String::new(),
                    tag: tag.to_string(),
                    value: Some(value),
                }],
            })),
        })
    }
}
