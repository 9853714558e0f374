//! Entry service: upload, lookup, listing, visibility and content reads.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::Serialize;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::db::Database;
use crate::thumbnail::{ThumbnailJob, ThumbnailQueue};
use crate::{Result, VaultError};

use super::access;
use super::listing::ListQuery;
use super::repository::EntryRepository;
use super::storage::BlobStore;
use super::types::{EntryType, EntryView, NewEntry};

/// Standard alphabet; padding optional on decode.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode upload content. Line breaks and other ASCII whitespace are ignored.
fn decode_content(data: &str) -> Result<Vec<u8>> {
    let compact: Vec<u8> = data
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    BASE64
        .decode(compact)
        .map_err(|_| VaultError::Validation("Invalid data".to_string()))
}

/// Parent reference of an upload, as sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentRef {
    /// Top-level entry.
    #[default]
    Root,
    /// Child of the given entry.
    Id(i64),
    /// A value that cannot name any entry.
    Invalid,
}

impl ParentRef {
    /// Parse the raw `parentId` value. Absent, empty and `0` mean top level.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return ParentRef::Root;
        }
        match raw.parse::<i64>() {
            Ok(0) => ParentRef::Root,
            Ok(id) if id > 0 => ParentRef::Id(id),
            _ => ParentRef::Invalid,
        }
    }
}

/// Request to create an entry.
///
/// Fields mirror the client payload and are validated by
/// [`EntryService::upload`].
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub name: Option<String>,
    pub entry_type: Option<String>,
    /// Base64-encoded content.
    pub data: Option<String>,
    pub parent: ParentRef,
    pub is_public: Option<bool>,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    #[serde(flatten)]
    pub entry: EntryView,
    /// Whether a thumbnail job was queued; only set for images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_queued: Option<bool>,
}

/// Content bytes with their media type.
#[derive(Debug, Clone)]
pub struct EntryContent {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Validated upload, ready to be stored.
struct ValidUpload {
    name: String,
    entry_type: EntryType,
    parent_id: Option<i64>,
    content: Option<Vec<u8>>,
    is_public: bool,
}

/// Entry operations over the metadata database and blob store.
pub struct EntryService<'a> {
    db: &'a Database,
    blobs: &'a BlobStore,
    thumbnails: Option<&'a ThumbnailQueue>,
}

impl<'a> EntryService<'a> {
    /// Create a new EntryService.
    pub fn new(db: &'a Database, blobs: &'a BlobStore) -> Self {
        Self {
            db,
            blobs,
            thumbnails: None,
        }
    }

    /// Submit thumbnail jobs for image uploads to `queue`.
    pub fn with_thumbnails(mut self, queue: &'a ThumbnailQueue) -> Self {
        self.thumbnails = Some(queue);
        self
    }

    fn repo(&self) -> EntryRepository<'_> {
        EntryRepository::new(self.db.pool())
    }

    /// Create an entry owned by `owner_id`.
    ///
    /// Validation stops at the first failure:
    /// name, type, data, parent, then the base64 payload itself.
    pub async fn upload(&self, owner_id: i64, request: &UploadRequest) -> Result<UploadOutcome> {
        let upload = self.validate(owner_id, request).await?;

        let mut new_entry = NewEntry::new(owner_id, upload.name, upload.entry_type)
            .with_parent(upload.parent_id)
            .with_public(upload.is_public);

        let content_id = match &upload.content {
            Some(bytes) => {
                let content_id = self.blobs.put(bytes).await?;
                new_entry = new_entry.with_content(content_id.clone());
                Some(content_id)
            }
            None => None,
        };

        let entry = match self.repo().create(&new_entry).await {
            Ok(entry) => entry,
            Err(e) => {
                if let Some(content_id) = &content_id {
                    if let Err(cleanup) = self.blobs.remove(content_id).await {
                        warn!(content_id = %content_id, "Failed to remove orphaned blob: {}", cleanup);
                    }
                }
                return Err(e);
            }
        };

        info!(
            owner_id,
            entry_id = entry.id,
            entry_type = %entry.entry_type,
            "Entry created"
        );

        let thumbnail_queued = match entry.entry_type {
            EntryType::Image => Some(self.queue_thumbnail(owner_id, entry.id)),
            _ => None,
        };

        Ok(UploadOutcome {
            entry: entry.view(),
            thumbnail_queued,
        })
    }

    async fn validate(&self, owner_id: i64, request: &UploadRequest) -> Result<ValidUpload> {
        let name = match request.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(VaultError::Validation("Missing name".to_string())),
        };

        let entry_type = request
            .entry_type
            .as_deref()
            .and_then(|t| t.parse::<EntryType>().ok())
            .ok_or_else(|| VaultError::Validation("Missing type".to_string()))?;

        let data = match request.data.as_deref() {
            Some(data) if !data.is_empty() => Some(data),
            _ if entry_type.has_content() => {
                return Err(VaultError::Validation("Missing data".to_string()))
            }
            _ => None,
        };

        let parent_id = match request.parent {
            ParentRef::Root => None,
            ParentRef::Invalid => {
                return Err(VaultError::Validation("Parent not found".to_string()))
            }
            ParentRef::Id(id) => {
                let parent = self
                    .repo()
                    .get_owned(id, owner_id)
                    .await?
                    .ok_or_else(|| VaultError::Validation("Parent not found".to_string()))?;
                if parent.entry_type != EntryType::Folder {
                    return Err(VaultError::Validation(
                        "Parent is not a folder".to_string(),
                    ));
                }
                Some(parent.id)
            }
        };

        let content = match data {
            Some(data) if entry_type.has_content() => Some(decode_content(data)?),
            _ => None,
        };

        Ok(ValidUpload {
            name,
            entry_type,
            parent_id,
            content,
            is_public: request.is_public.unwrap_or(false),
        })
    }

    fn queue_thumbnail(&self, owner_id: i64, entry_id: i64) -> bool {
        let Some(queue) = self.thumbnails else {
            warn!(owner_id, entry_id, "No thumbnail queue configured");
            return false;
        };
        match queue.submit(ThumbnailJob { owner_id, entry_id }) {
            Ok(()) => true,
            Err(e) => {
                warn!(owner_id, entry_id, "Thumbnail job not queued: {}", e);
                false
            }
        }
    }

    /// Get an entry owned by `owner_id`.
    pub async fn get(&self, owner_id: i64, entry_id: i64) -> Result<EntryView> {
        self.repo()
            .get_owned(entry_id, owner_id)
            .await?
            .map(EntryView::from)
            .ok_or_else(|| VaultError::NotFound("entry".to_string()))
    }

    /// List one page of `owner_id`'s entries.
    pub async fn list(&self, owner_id: i64, query: &ListQuery) -> Result<Vec<EntryView>> {
        let entries = self.repo().list_by_owner(owner_id, query).await?;
        debug!(owner_id, page = query.page, count = entries.len(), "Listed entries");
        Ok(entries.into_iter().map(EntryView::from).collect())
    }

    /// Set the visibility of an entry owned by `owner_id`.
    pub async fn set_visibility(
        &self,
        owner_id: i64,
        entry_id: i64,
        is_public: bool,
    ) -> Result<EntryView> {
        let entry = self
            .repo()
            .set_public(entry_id, owner_id, is_public)
            .await?
            .ok_or_else(|| VaultError::NotFound("entry".to_string()))?;

        info!(owner_id, entry_id, is_public, "Entry visibility changed");
        Ok(entry.view())
    }

    /// Make an entry public.
    pub async fn publish(&self, owner_id: i64, entry_id: i64) -> Result<EntryView> {
        self.set_visibility(owner_id, entry_id, true).await
    }

    /// Make an entry private.
    pub async fn unpublish(&self, owner_id: i64, entry_id: i64) -> Result<EntryView> {
        self.set_visibility(owner_id, entry_id, false).await
    }

    /// Read an entry's content, or one of its size variants.
    ///
    /// `caller` is `None` for anonymous requests. Entries the caller may not
    /// read are reported as not found.
    pub async fn read_content(
        &self,
        caller: Option<i64>,
        entry_id: i64,
        size: Option<&str>,
    ) -> Result<EntryContent> {
        let entry = access::ensure_readable(self.repo().get_by_id(entry_id).await?, caller)?;

        let content_id = match (&entry.entry_type, &entry.content_id) {
            (EntryType::Folder, _) => {
                return Err(VaultError::InvalidOperation(
                    "A folder doesn't have a content".to_string(),
                ))
            }
            (_, Some(content_id)) => content_id,
            (_, None) => return Err(VaultError::NotFound("content".to_string())),
        };

        let size = match size.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<u32>()
                    .map_err(|_| VaultError::NotFound("content".to_string()))?,
            ),
        };

        let bytes = self.blobs.read(content_id, size).await?;
        Ok(EntryContent {
            bytes,
            content_type: content_type_for(&entry.name),
        })
    }
}

/// Media type for a file name, with a UTF-8 charset for text types.
pub fn content_type_for(name: &str) -> String {
    let mime = mime_guess::from_path(name).first_or_octet_stream();
    if mime.type_() == mime_guess::mime::TEXT {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.essence_str().to_string()
    }
}
