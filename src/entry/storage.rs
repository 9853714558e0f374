//! Blob storage for entry content.
//!
//! Content lives in a flat directory keyed by content ID:
//! ```text
//! {root}/
//! ├── 3f2a...c1            primary content
//! ├── 3f2a...c1_500        derived variants written by the thumbnail worker
//! └── 3f2a...c1_100
//! ```

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::{Result, VaultError};

/// Filesystem-backed content store.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generate a fresh content ID.
    pub fn generate_content_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Make sure the root directory exists.
    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| storage_error("create storage root", &self.root, e))
    }

    /// Write `bytes` under a new content ID and return the ID.
    ///
    /// The bytes are written to a temporary file first and renamed into
    /// place, so a content ID never names a partially written file.
    pub async fn put(&self, bytes: &[u8]) -> Result<String> {
        self.ensure_root().await?;

        let content_id = Self::generate_content_id();
        let final_path = self.content_path(&content_id);
        let temp_path = self.root.join(format!(".{content_id}.tmp"));

        if let Err(e) = fs::write(&temp_path, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(storage_error("write", &temp_path, e));
        }
        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(storage_error("commit", &final_path, e));
        }

        debug!(content_id = %content_id, size = bytes.len(), "Stored blob");
        Ok(content_id)
    }

    /// Path of the primary content for `content_id`.
    pub fn content_path(&self, content_id: &str) -> PathBuf {
        self.root.join(content_id)
    }

    /// Path of the `size` variant for `content_id`.
    pub fn variant_path(&self, content_id: &str, size: u32) -> PathBuf {
        self.root.join(format!("{content_id}_{size}"))
    }

    /// Read the primary content, or the `size` variant when given.
    pub async fn read(&self, content_id: &str, size: Option<u32>) -> Result<Vec<u8>> {
        let path = match size {
            Some(size) => self.variant_path(content_id, size),
            None => self.content_path(content_id),
        };

        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::NotFound("content".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether primary content exists for `content_id`.
    pub async fn exists(&self, content_id: &str) -> bool {
        fs::try_exists(self.content_path(content_id))
            .await
            .unwrap_or(false)
    }

    /// Remove primary content. Returns `false` if it did not exist.
    pub async fn remove(&self, content_id: &str) -> Result<bool> {
        match fs::remove_file(self.content_path(content_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn storage_error(action: &str, path: &Path, err: io::Error) -> VaultError {
    VaultError::Storage(format!("{action} {}: {err}", path.display()))
}
