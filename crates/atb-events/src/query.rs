//! Read-only lookups by tag.
//!
//! Every call reads the current index, so results always reflect the most
//! recent completed reload.

use std::sync::Arc;

use crate::error::EventsError;
use crate::record::{AudioRecord, ImageRecord, ScalarRecord};
use crate::store::EventStore;

impl EventStore {
    /// Scalar records for `tag`, in the order they were logged.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::UnknownTag`] if `tag` is not a scalar tag.
    pub fn scalars(&self, tag: &str) -> Result<Vec<Arc<ScalarRecord>>, EventsError> {
        self.records(tag)
    }

    /// Image records for `tag`, in the order they were logged.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::UnknownTag`] if `tag` is not an image tag.
    pub fn images(&self, tag: &str) -> Result<Vec<Arc<ImageRecord>>, EventsError> {
        self.records(tag)
    }

    /// Audio records for `tag`, in the order they were logged.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::UnknownTag`] if `tag` is not an audio tag.
    pub fn audio(&self, tag: &str) -> Result<Vec<Arc<AudioRecord>>, EventsError> {
        self.records(tag)
    }
}
