//! Entries: files and folders owned by users.
//!
//! This module provides:
//! - Entry metadata storage (`EntryRepository`)
//! - Content storage in a flat blob directory (`BlobStore`)
//! - Ownership and visibility rules
//! - The `EntryService` that ties them together for the HTTP layer

pub mod access;
mod listing;
mod repository;
mod service;
mod storage;
mod types;

pub use listing::{parse_page, ListQuery, ParentFilter, PAGE_SIZE};
pub use repository::EntryRepository;
pub use service::{
    content_type_for, EntryContent, EntryService, ParentRef, UploadOutcome, UploadRequest,
};
pub use storage::BlobStore;
pub use types::{Entry, EntryType, EntryView, NewEntry};
