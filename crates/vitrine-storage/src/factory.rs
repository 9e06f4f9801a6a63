#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{RemoteStore, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use std::time::Duration;
use vitrine_core::Config;

/// Create a storage backend based on configuration
///
/// Only backends that need nothing beyond the configuration are built here. The
/// `http` backend shares the API client's connection and auth, so it is created by
/// `vitrine_api_client::create_store`, which falls back to this function.
pub async fn create_store(config: &Config) -> StorageResult<Arc<dyn RemoteStore>> {
    match config.storage_backend {
        StorageBackend::Http => Err(StorageError::ConfigError(
            "http storage backend requires an API client".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("VITRINE_LOCAL_STORAGE_PATH not configured".to_string())
            })?;

            let storage = LocalStorage::new(
                base_path,
                config.local_storage_base_url.clone(),
                config.max_file_size_bytes,
                Duration::from_secs(config.grant_ttl_secs),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_local_store_from_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            storage_backend: StorageBackend::Local,
            local_storage_path: Some(dir.path().display().to_string()),
            ..Config::default()
        };

        let store = create_store(&config).await.unwrap();
        assert_eq!(store.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn http_backend_is_not_built_here() {
        let err = create_store(&Config::default()).await.err().unwrap();
        assert!(matches!(err, StorageError::ConfigError(_)));
    }

    #[tokio::test]
    async fn local_backend_requires_path() {
        let config = Config {
            storage_backend: StorageBackend::Local,
            ..Config::default()
        };
        assert!(create_store(&config).await.is_err());
    }
}
