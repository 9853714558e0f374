//! Configuration module for filevault.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, VaultError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty allows any origin).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/filevault.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for stored content and derived variants.
    #[serde(default = "default_folder_path")]
    pub folder_path: String,

    /// Maximum request body size for uploads, in megabytes.
    #[serde(default = "default_max_upload_size_mb")]
    pub max_upload_size_mb: u64,
}

fn default_folder_path() -> String {
    "/tmp/files_manager".to_string()
}

fn default_max_upload_size_mb() -> u64 {
    16
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            folder_path: default_folder_path(),
            max_upload_size_mb: default_max_upload_size_mb(),
        }
    }
}

/// Session lookup configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// How long a resolved token stays in the in-process cache.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_cache_ttl() -> u64 {
    60
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

/// Thumbnail job configuration.
///
/// `sizes` and `max_attempts` are not used by the service itself; they are
/// handed to the external worker through the job receiver.
#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailsConfig {
    /// Capacity of the in-process job channel.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Widths the worker renders for each image.
    #[serde(default = "default_sizes")]
    pub sizes: Vec<u32>,
    /// Attempts the worker makes per job before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// JSON-lines file the binary appends queued jobs to.
    #[serde(default = "default_spool_path")]
    pub spool_path: String,
}

fn default_queue_capacity() -> usize {
    256
}

fn default_sizes() -> Vec<u32> {
    vec![500, 250, 100]
}

fn default_max_attempts() -> u32 {
    3
}

fn default_spool_path() -> String {
    "data/thumbnail_jobs.jsonl".to_string()
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            sizes: default_sizes(),
            max_attempts: default_max_attempts(),
            spool_path: default_spool_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/filevault.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session lookup configuration.
    #[serde(default)]
    pub sessions: SessionsConfig,
    /// Thumbnail job configuration.
    #[serde(default)]
    pub thumbnails: ThumbnailsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(VaultError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VaultError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PORT`: listen port
    /// - `FOLDER_PATH`: blob storage root
    /// - `FILEVAULT_DB_PATH`: SQLite database path
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(path) = lookup("FOLDER_PATH").filter(|p| !p.is_empty()) {
            self.storage.folder_path = path;
        }
        if let Some(path) = lookup("FILEVAULT_DB_PATH").filter(|p| !p.is_empty()) {
            self.database.path = path;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(VaultError::Config("server.port must not be 0".to_string()));
        }
        if self.storage.folder_path.trim().is_empty() {
            return Err(VaultError::Config(
                "storage.folder_path must not be empty".to_string(),
            ));
        }
        if self.storage.max_upload_size_mb == 0 {
            return Err(VaultError::Config(
                "storage.max_upload_size_mb must be at least 1".to_string(),
            ));
        }
        if self.thumbnails.queue_capacity == 0 {
            return Err(VaultError::Config(
                "thumbnails.queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.thumbnails.max_attempts == 0 {
            return Err(VaultError::Config(
                "thumbnails.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
