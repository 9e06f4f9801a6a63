//! Remote store abstraction trait
//!
//! This module defines the RemoteStore trait that all storage backends must implement.
//! Writes are two-phase: a short-lived [`WriteGrant`] is requested for one path, then the
//! bytes are sent directly to the granted URL.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write grant failed: {0}")]
    GrantFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Object of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("Write grant for {0} has expired")]
    GrantExpired(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage path: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Short-lived authorization to write exactly one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteGrant {
    pub path: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl WriteGrant {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Remote store abstraction trait
///
/// Implementations never retry on their own; callers decide what a failure means.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Obtain a write grant for `path`.
    async fn request_write_grant(&self, path: &str) -> StorageResult<WriteGrant>;

    /// Write `data` to the path the grant was issued for.
    async fn upload(&self, grant: &WriteGrant, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Remove objects. Paths that do not exist are skipped.
    async fn delete_paths(&self, paths: &[String]) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
