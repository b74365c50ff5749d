//! Event log access for audio-tensorboard.
//!
//! Reads TensorBoard event files (TFRecord-framed `Event` protobufs) into an
//! in-memory index of scalar, image and audio series keyed by tag, and keeps
//! that index current by re-reading the file from the last consumed offset.
//!
//! # Layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | `tfrecord` | record framing and checksums, incremental reader |
//! | `proto` | the subset of `Event`/`Summary` messages that is decoded |
//! | `index` | per-kind, per-tag record series |
//! | `store` | event file resolution, initial load, reload |
//! | `query` | lookups by tag |
//! | `writer` | writes event files in the same format |
//!
//! # Usage
//!
//! ```rust,no_run
//! use atb_events::EventStore;
//!
//! let store = EventStore::initialize("runs/exp1")?;
//! for tag in &store.tags().scalars {
//!     let series = store.scalars(tag)?;
//!     println!("{tag}: {} points", series.len());
//! }
//! store.reload();
//! # Ok::<(), atb_events::EventsError>(())
//! ```

mod error;
mod index;
pub mod proto;
mod query;
mod record;
mod store;
pub mod tfrecord;
mod writer;

pub use error::{EventsError, RecordError};
pub use index::{EventIndex, TagSnapshot};
pub use record::{
    AudioRecord, ImageRecord, ParseTagKindError, RecordKind, ScalarRecord, TagKind,
    IMAGE_CONTENT_TYPE,
};
pub use store::{
    find_event_file, EventStore, LogSource, EMPTY_PROFILE_SUFFIX, EVENT_FILE_MARKER,
    UNKNOWN_FORMAT_VERSION,
};
pub use writer::{EventWriter, FILE_VERSION};
