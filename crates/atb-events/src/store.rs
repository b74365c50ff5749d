//! The event store: resolves the log source, owns the shared index, and
//! merges newly appended records on reload.
//!
//! Reloads are serialized by the reader mutex. New records are read and
//! decoded without touching the index, then appended under a single write
//! lock, so concurrent readers see either the state before a reload or the
//! state after it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};

use prost::Message;

use crate::error::{EventsError, RecordError};
use crate::index::{updates_from_event, EventIndex, TagSnapshot};
use crate::proto;
use crate::record::RecordKind;
use crate::tfrecord::RecordReader;

/// Substring that identifies an event file name.
pub const EVENT_FILE_MARKER: &str = "tfevents";

/// Suffix of the placeholder files written by the profiler plugin.
pub const EMPTY_PROFILE_SUFFIX: &str = ".profile-empty";

/// Reported by [`EventStore::format_version`] when the log carries no
/// `file_version` event.
pub const UNKNOWN_FORMAT_VERSION: &str = "unknown";

/// The path the user pointed at and the event file chosen from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSource {
    root: PathBuf,
    event_file: PathBuf,
}

impl LogSource {
    /// Resolves `path` to a concrete event file.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::NotFound`] if `path` is neither a file nor a
    /// directory containing an event file.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self, EventsError> {
        let root = path.as_ref().to_path_buf();
        let event_file =
            find_event_file(&root).ok_or_else(|| EventsError::NotFound(root.clone()))?;
        Ok(Self { root, event_file })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn event_file(&self) -> &Path {
        &self.event_file
    }
}

/// Returns `path` itself if it is a file, otherwise the first event file
/// found below it.
///
/// Directories are walked depth-first in lexicographic order, checking a
/// directory's own files before descending into its subdirectories.
/// Symlinked directories are not followed.
pub fn find_event_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if !path.is_dir() {
        return None;
    }
    search_dir(path)
}

fn search_dir(dir: &Path) -> Option<PathBuf> {
    let mut entries: Vec<fs::DirEntry> = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir.filter_map(Result::ok).collect(),
        Err(e) => {
            tracing::debug!(path = %dir.display(), error = %e, "skipping unreadable directory");
            return None;
        }
    };
    entries.sort_by_key(fs::DirEntry::file_name);

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            subdirs.push(path);
        } else if path.is_file() && is_event_file_name(&entry.file_name().to_string_lossy()) {
            return Some(path);
        }
    }

    subdirs.iter().find_map(|subdir| search_dir(subdir))
}

fn is_event_file_name(name: &str) -> bool {
    name.contains(EVENT_FILE_MARKER) && !name.ends_with(EMPTY_PROFILE_SUFFIX)
}

/// Shared, incrementally reloaded view of one event file.
#[derive(Debug)]
pub struct EventStore {
    source: LogSource,
    reader: Mutex<RecordReader>,
    index: RwLock<EventIndex>,
}

impl EventStore {
    /// Resolves `path` and performs the initial full load.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::NotFound`] if no event file exists under `path`
    /// and [`EventsError::Load`] if the file cannot be read or its first
    /// record is corrupt.
    pub fn initialize(path: impl AsRef<Path>) -> Result<Self, EventsError> {
        let source = LogSource::resolve(path)?;
        tracing::info!(
            root = %source.root().display(),
            event_file = %source.event_file().display(),
            "resolved event file"
        );

        let store = Self {
            reader: Mutex::new(RecordReader::new(source.event_file())),
            index: RwLock::new(EventIndex::default()),
            source,
        };

        let loaded = store.merge_new_records().map_err(|source| EventsError::Load {
            path: store.source.event_file().to_path_buf(),
            source,
        })?;

        tracing::info!(
            records = loaded,
            file_version = %store.format_version(),
            "loaded event file"
        );
        Ok(store)
    }

    pub fn source(&self) -> &LogSource {
        &self.source
    }

    /// Re-reads the event file and merges any newly appended records.
    ///
    /// Failures are logged and swallowed; the next call retries from the
    /// last fully consumed record. Returns the number of records merged.
    pub fn reload(&self) -> usize {
        match self.try_reload() {
            Ok(merged) => {
                if merged > 0 {
                    tracing::debug!(merged, "merged new event records");
                }
                merged
            }
            Err(e) => {
                tracing::warn!(
                    event_file = %self.source.event_file().display(),
                    error = %e,
                    "event file reload failed"
                );
                0
            }
        }
    }

    /// Like [`reload`](Self::reload), but returns the failure to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::Reload`] when the file cannot be re-read.
    pub fn try_reload(&self) -> Result<usize, EventsError> {
        self.merge_new_records().map_err(EventsError::Reload)
    }

    /// Current tag names per kind.
    pub fn tags(&self) -> TagSnapshot {
        self.read_index().tags()
    }

    /// The log's `file_version` string, e.g. `brain.Event:2`.
    pub fn format_version(&self) -> String {
        self.read_index()
            .file_version()
            .unwrap_or(UNKNOWN_FORMAT_VERSION)
            .to_string()
    }

    pub fn record_count(&self) -> usize {
        self.read_index().record_count()
    }

    /// The stored series for `tag` in the namespace of `R`.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::UnknownTag`] if `tag` has no `R` records.
    pub fn records<R: RecordKind>(&self, tag: &str) -> Result<Vec<Arc<R>>, EventsError> {
        self.read_index()
            .series::<R>(tag)
            .map(<[Arc<R>]>::to_vec)
            .ok_or_else(|| EventsError::UnknownTag {
                kind: R::KIND,
                tag: tag.to_string(),
            })
    }

    fn read_index(&self) -> RwLockReadGuard<'_, EventIndex> {
        self.index.read().unwrap_or_else(|e| e.into_inner())
    }

    fn merge_new_records(&self) -> Result<usize, RecordError> {
        // Held until the batch is applied so batches land in file order.
        let mut reader = self.reader.lock().unwrap_or_else(|e| e.into_inner());
        let payloads = reader.read_available()?;

        let mut updates = Vec::new();
        for payload in payloads {
            match proto::Event::decode(payload.as_slice()) {
                Ok(event) => updates.extend(updates_from_event(event)),
                Err(e) => {
                    tracing::warn!(
                        event_file = %self.source.event_file().display(),
                        error = %e,
                        "skipping undecodable event"
                    );
                }
            }
        }

        if updates.is_empty() {
            return Ok(0);
        }

        let mut index = self.index.write().unwrap_or_else(|e| e.into_inner());
        Ok(index.apply(updates))
    }
}
