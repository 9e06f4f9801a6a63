use crate::keys::validate_path;
use crate::traits::{RemoteStore, StorageError, StorageResult, WriteGrant};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Grants are `file://` URLs for a single path; an upload is only accepted with the
/// grant issued for its path, before the grant expires and within the size limit.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: Option<String>,
    max_object_size: usize,
    grant_ttl: Duration,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored images (e.g., "/var/lib/vitrine/images")
    /// * `base_url` - Optional base URL the directory is served from
    /// * `max_object_size` - Largest accepted object in bytes
    /// * `grant_ttl` - Lifetime of issued write grants
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: Option<String>,
        max_object_size: usize,
        grant_ttl: Duration,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            max_object_size,
            grant_ttl,
        })
    }

    /// Convert a storage path to a filesystem path with traversal validation
    fn key_to_path(&self, storage_path: &str) -> StorageResult<PathBuf> {
        if !validate_path(storage_path) {
            return Err(StorageError::InvalidKey(format!(
                "Storage path contains invalid segments: {}",
                storage_path
            )));
        }

        let path = self.base_path.join(storage_path);
        if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage path resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    fn grant_url(&self, storage_path: &str) -> String {
        let encoded: Vec<String> = storage_path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "file://{}/{}",
            self.base_path.display().to_string().trim_end_matches('/'),
            encoded.join("/")
        )
    }

    /// Public URL of a stored path, when the directory is served over HTTP.
    pub fn public_url(&self, storage_path: &str) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), storage_path))
    }

    /// Read a stored object back.
    pub async fn read(&self, storage_path: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_path)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_path.to_string()));
        }
        Ok(fs::read(&path).await?)
    }

    pub async fn exists(&self, storage_path: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_path)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for LocalStorage {
    async fn request_write_grant(&self, storage_path: &str) -> StorageResult<WriteGrant> {
        self.key_to_path(storage_path)
            .map_err(|e| StorageError::GrantFailed(e.to_string()))?;

        let ttl = chrono::Duration::from_std(self.grant_ttl)
            .map_err(|e| StorageError::ConfigError(format!("Invalid grant lifetime: {}", e)))?;

        Ok(WriteGrant {
            path: storage_path.to_string(),
            url: self.grant_url(storage_path),
            expires_at: Some(Utc::now() + ttl),
        })
    }

    async fn upload(&self, grant: &WriteGrant, data: Bytes, _content_type: &str) -> StorageResult<()> {
        let path = self.key_to_path(&grant.path)?;
        let size = data.len();

        if grant.url != self.grant_url(&grant.path) {
            return Err(StorageError::UploadFailed(format!(
                "Grant was not issued for {}",
                grant.path
            )));
        }
        if grant.is_expired(Utc::now()) {
            return Err(StorageError::GrantExpired(grant.path.clone()));
        }
        if size > self.max_object_size {
            return Err(StorageError::TooLarge {
                size,
                max: self.max_object_size,
            });
        }

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %grant.path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn delete_paths(&self, paths: &[String]) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let mut removed = 0usize;

        for storage_path in paths {
            let path = self.key_to_path(storage_path)?;

            if !fs::try_exists(&path).await.unwrap_or(false) {
                continue;
            }

            fs::remove_file(&path).await.map_err(|e| {
                StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            removed += 1;
        }

        tracing::info!(
            requested = paths.len(),
            removed,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage(dir: &TempDir, max: usize) -> LocalStorage {
        LocalStorage::new(dir.path(), None, max, Duration::from_secs(300))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn grant_then_upload_writes_file() {
        let dir = TempDir::new().unwrap();
        let store = storage(&dir, 1024).await;

        let grant = store.request_write_grant("p1/original/1_a.png").await.unwrap();
        assert!(grant.url.starts_with("file://"));
        assert!(grant.expires_at.is_some());

        store
            .upload(&grant, Bytes::from_static(b"png-bytes"), "image/png")
            .await
            .unwrap();

        assert_eq!(store.read("p1/original/1_a.png").await.unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn rejects_objects_over_the_limit() {
        let dir = TempDir::new().unwrap();
        let store = storage(&dir, 4).await;

        let grant = store.request_write_grant("p1/original/1_a.png").await.unwrap();
        let err = store
            .upload(&grant, Bytes::from_static(b"too large"), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { size: 9, max: 4 }));
        assert!(!store.exists("p1/original/1_a.png").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_grant_for_another_path() {
        let dir = TempDir::new().unwrap();
        let store = storage(&dir, 1024).await;

        let mut grant = store.request_write_grant("p1/original/1_a.png").await.unwrap();
        grant.path = "p1/original/1_b.png".to_string();
        let err = store
            .upload(&grant, Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed(_)));
    }

    #[tokio::test]
    async fn rejects_expired_grant() {
        let dir = TempDir::new().unwrap();
        let store = storage(&dir, 1024).await;

        let mut grant = store.request_write_grant("p1/original/1_a.png").await.unwrap();
        grant.expires_at = Some(Utc::now() - chrono::Duration::seconds(1));
        let err = store
            .upload(&grant, Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::GrantExpired(_)));
    }

    #[tokio::test]
    async fn grant_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = storage(&dir, 1024).await;

        let err = store.request_write_grant("../outside.png").await.unwrap_err();
        assert!(matches!(err, StorageError::GrantFailed(_)));
    }

    #[tokio::test]
    async fn delete_skips_missing_objects() {
        let dir = TempDir::new().unwrap();
        let store = storage(&dir, 1024).await;

        let grant = store.request_write_grant("p1/resized/1_a_720x.png").await.unwrap();
        store
            .upload(&grant, Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap();

        store
            .delete_paths(&[
                "p1/resized/1_a_720x.png".to_string(),
                "p1/resized/1_a_900x.png".to_string(),
            ])
            .await
            .unwrap();

        assert!(!store.exists("p1/resized/1_a_720x.png").await.unwrap());
    }

    #[tokio::test]
    async fn public_url_uses_base_url() {
        let dir = TempDir::new().unwrap();
        let store = LocalStorage::new(
            dir.path(),
            Some("http://localhost:8080/images/".to_string()),
            1024,
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        assert_eq!(
            store.public_url("p1/original/1_a.png").as_deref(),
            Some("http://localhost:8080/images/p1/original/1_a.png")
        );
        assert_eq!(store.backend_type(), StorageBackend::Local);
    }
}
