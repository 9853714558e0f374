//! Thumbnail job queue.
//!
//! Image uploads submit a [`ThumbnailJob`] to a bounded in-process channel.
//! The receiving side is handed to whatever drives the external thumbnail
//! worker; the binary spools jobs to a JSON-lines file with
//! [`ThumbnailReceiver::spool`].

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info};

use crate::{Result, VaultError};

/// Request to derive size variants for an image entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailJob {
    pub owner_id: i64,
    pub entry_id: i64,
}

/// A job as written to the spool file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpooledJob {
    #[serde(flatten)]
    pub job: ThumbnailJob,
    /// Attempts the worker may make before giving up.
    pub max_attempts: u32,
    /// Variant sizes to produce.
    pub sizes: Vec<u32>,
    pub queued_at: DateTime<Utc>,
}

/// Producer side of the thumbnail queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ThumbnailQueue {
    sender: mpsc::Sender<ThumbnailJob>,
}

impl ThumbnailQueue {
    /// Create a queue holding at most `capacity` pending jobs.
    pub fn bounded(capacity: usize, max_attempts: u32) -> (Self, ThumbnailReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self { sender },
            ThumbnailReceiver {
                receiver,
                max_attempts,
                sizes: Vec::new(),
            },
        )
    }

    /// Submit a job without waiting.
    ///
    /// Fails with [`VaultError::Queue`] when the queue is full or the
    /// receiver is gone.
    pub fn submit(&self, job: ThumbnailJob) -> Result<()> {
        match self.sender.try_send(job) {
            Ok(()) => {
                debug!(owner_id = job.owner_id, entry_id = job.entry_id, "Thumbnail job queued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(VaultError::Queue("queue is full".to_string())),
            Err(TrySendError::Closed(_)) => Err(VaultError::Queue("queue is closed".to_string())),
        }
    }
}

/// Consumer side of the thumbnail queue.
#[derive(Debug)]
pub struct ThumbnailReceiver {
    receiver: mpsc::Receiver<ThumbnailJob>,
    max_attempts: u32,
    sizes: Vec<u32>,
}

impl ThumbnailReceiver {
    /// Set the variant sizes recorded with spooled jobs.
    pub fn with_sizes(mut self, sizes: Vec<u32>) -> Self {
        self.sizes = sizes;
        self
    }

    /// Retry budget the consumer should apply per job.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait for the next job. Returns `None` once every producer is dropped
    /// and the queue is drained.
    pub async fn recv(&mut self) -> Option<ThumbnailJob> {
        self.receiver.recv().await
    }

    /// Append every job to `path` as one JSON object per line until all
    /// producers are dropped. Returns the number of jobs written.
    pub async fn spool(mut self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        info!("Spooling thumbnail jobs to {:?}", path);

        let mut written = 0u64;
        while let Some(job) = self.receiver.recv().await {
            let record = SpooledJob {
                job,
                max_attempts: self.max_attempts,
                sizes: self.sizes.clone(),
                queued_at: Utc::now(),
            };
            let mut line =
                serde_json::to_string(&record).map_err(|e| VaultError::Queue(e.to_string()))?;
            line.push('\n');
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
            written += 1;
        }

        info!(jobs = written, "Thumbnail spool finished");
        Ok(written)
    }
}
