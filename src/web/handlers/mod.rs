//! API handlers.

pub mod entry;

pub use entry::*;

use std::sync::Arc;

use crate::entry::{BlobStore, EntryService};
use crate::session::SessionResolver;
use crate::thumbnail::ThumbnailQueue;
use crate::Database;

/// Shared application state.
///
/// Every handle is created once at startup and shared by all requests.
#[derive(Clone)]
pub struct AppState {
    /// Metadata database.
    pub db: Database,
    /// Content storage.
    pub blobs: BlobStore,
    /// Session token lookup.
    pub sessions: Arc<dyn SessionResolver>,
    /// Thumbnail job producer.
    pub thumbnails: ThumbnailQueue,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Database,
        blobs: BlobStore,
        sessions: Arc<dyn SessionResolver>,
        thumbnails: ThumbnailQueue,
    ) -> Self {
        Self {
            db,
            blobs,
            sessions,
            thumbnails,
        }
    }

    /// Entry service bound to this state.
    pub fn entries(&self) -> EntryService<'_> {
        EntryService::new(&self.db, &self.blobs).with_thumbnails(&self.thumbnails)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("blobs", &self.blobs)
            .finish()
    }
}
