//! Error types for event-file loading and tag queries.

use std::path::PathBuf;

use crate::record::TagKind;

/// Framing-level failures while reading TFRecord data from an event file.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The event file could not be opened, seeked or read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A record header or payload failed its checksum.
    #[error("corrupt record at byte offset {offset}: {reason}")]
    Corrupt {
        /// Byte offset of the start of the offending record.
        offset: u64,
        /// Which checksum failed.
        reason: &'static str,
    },

    /// The file is shorter than the data already consumed from it.
    #[error("event file shrank to {len} bytes, below committed offset {offset}")]
    Truncated {
        /// Current file length.
        len: u64,
        /// Offset of the last fully consumed record.
        offset: u64,
    },
}

/// Errors surfaced by the event store and the query facade.
#[derive(Debug, thiserror::Error)]
pub enum EventsError {
    /// No event file exists at or below the given path.
    #[error("no event file found in {}", .0.display())]
    NotFound(PathBuf),

    /// The event file exists but could not be loaded.
    #[error("failed to load event file {}: {source}", path.display())]
    Load {
        /// The resolved event file.
        path: PathBuf,
        /// What went wrong while reading it.
        #[source]
        source: RecordError,
    },

    /// The requested tag is not known for the requested record kind.
    #[error("unknown {kind} tag: {tag}")]
    UnknownTag {
        /// Which tag namespace was searched.
        kind: TagKind,
        /// The tag that was requested.
        tag: String,
    },

    /// An incremental re-read of the event file failed.
    #[error("reload failed: {0}")]
    Reload(#[source] RecordError),
}
