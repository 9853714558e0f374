//! filevault - owner-scoped file and folder storage.
//!
//! Entries (folders, files and images) belong to the user whose session
//! token created them. Content is kept in a flat blob directory, visibility
//! is private by default and can be toggled to public, and image uploads
//! produce thumbnail jobs for an external worker.

pub mod config;
pub mod db;
pub mod entry;
pub mod error;
pub mod logging;
pub mod session;
pub mod thumbnail;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use entry::{
    BlobStore, Entry, EntryRepository, EntryService, EntryType, EntryView, ListQuery,
    ParentFilter, ParentRef, UploadOutcome, UploadRequest,
};
pub use error::{Result, VaultError};
pub use session::{MemorySessionStore, SessionResolver, SqlSessionStore};
pub use thumbnail::{ThumbnailJob, ThumbnailQueue, ThumbnailReceiver};
pub use web::{create_router, AppState, WebServer};
