//! [`RemoteStore`] backed by signed upload URLs.

use crate::ApiClient;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use vitrine_core::{Config, StorageBackend};
use vitrine_storage::{RemoteStore, StorageError, StorageResult, WriteGrant};

/// Object storage reached through the storefront API.
///
/// Writes use the Signing Service and a direct `PUT` to the signed URL; deletions go
/// through the API's delete-storage route.
#[derive(Clone, Debug)]
pub struct HttpStore {
    client: ApiClient,
    grant_ttl: Duration,
}

impl HttpStore {
    pub fn new(client: ApiClient, grant_ttl: Duration) -> Self {
        Self { client, grant_ttl }
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn request_write_grant(&self, path: &str) -> StorageResult<WriteGrant> {
        let signed = self
            .client
            .signed_upload(path)
            .await
            .map_err(|e| StorageError::GrantFailed(format!("{:#}", e)))?;

        if signed.path != path {
            return Err(StorageError::GrantFailed(format!(
                "signed URL issued for {} instead of {}",
                signed.path, path
            )));
        }

        let expires_at = chrono::Duration::from_std(self.grant_ttl)
            .ok()
            .map(|ttl| Utc::now() + ttl);

        Ok(WriteGrant {
            path: signed.path,
            url: signed.url,
            expires_at,
        })
    }

    async fn upload(&self, grant: &WriteGrant, data: Bytes, content_type: &str) -> StorageResult<()> {
        if grant.is_expired(Utc::now()) {
            return Err(StorageError::GrantExpired(grant.path.clone()));
        }

        let size = data.len();
        let start = Instant::now();

        self.client
            .put_bytes(&grant.url, data, content_type)
            .await
            .map_err(|e| match crate::status_of(&e) {
                Some(413) => StorageError::UploadFailed(format!(
                    "{} rejected by storage: object too large ({} bytes)",
                    grant.path, size
                )),
                _ => StorageError::UploadFailed(format!("{:#}", e)),
            })?;

        tracing::info!(
            key = %grant.path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Signed upload successful"
        );

        Ok(())
    }

    async fn delete_paths(&self, paths: &[String]) -> StorageResult<()> {
        if paths.is_empty() {
            return Ok(());
        }

        self.client
            .delete_storage(paths)
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("{:#}", e)))?;

        tracing::info!(requested = paths.len(), "Storage delete successful");
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Http
    }
}

/// Create the configured storage backend, reusing `client` for the `http` backend.
pub async fn create_store(config: &Config, client: &ApiClient) -> StorageResult<Arc<dyn RemoteStore>> {
    match config.storage_backend {
        StorageBackend::Http => Ok(Arc::new(HttpStore::new(
            client.clone(),
            Duration::from_secs(config.grant_ttl_secs),
        ))),
        StorageBackend::Local => vitrine_storage::create_store(config).await,
    }
}
