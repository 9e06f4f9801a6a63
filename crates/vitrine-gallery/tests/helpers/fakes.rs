//! In-memory collaborators with failure switches and call counters.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use vitrine_core::models::{ImageRecord, NewImageRecord, OrderChange, OwnerId, RecordId, SourceFile};
use vitrine_core::{RecordError, RecordGateway, RecordResult, StorageBackend};
use vitrine_processing::{ProcessingError, ProcessingResult, ResizedImage, VariantResizer};
use vitrine_storage::{RemoteStore, StorageError, StorageResult, WriteGrant};

#[derive(Default)]
pub struct FakeGateway {
    records: Mutex<BTreeMap<String, (OwnerId, ImageRecord)>>,
    next_id: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_update: AtomicBool,
    create_delay: Mutex<Option<Duration>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_create_delay(self, delay: Duration) -> Self {
        *self.create_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn seed(&self, owner_id: &OwnerId, basename: &str, extension: &str, order: i64) -> RecordId {
        let id = RecordId::new(format!("seed_{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        self.records.lock().unwrap().insert(
            id.as_str().to_string(),
            (
                owner_id.clone(),
                ImageRecord {
                    id: id.clone(),
                    basename: basename.to_string(),
                    extension: extension.to_string(),
                    order,
                },
            ),
        );
        id
    }

    pub fn record(&self, id: &RecordId) -> Option<ImageRecord> {
        self.records
            .lock()
            .unwrap()
            .get(id.as_str())
            .map(|(_, record)| record.clone())
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordGateway for FakeGateway {
    async fn create_image(&self, record: NewImageRecord) -> RecordResult<RecordId> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.create_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RecordError::Request("connection reset".to_string()));
        }

        let id = RecordId::new(format!("img_{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        self.records.lock().unwrap().insert(
            id.as_str().to_string(),
            (
                record.owner_id,
                ImageRecord {
                    id: id.clone(),
                    basename: record.basename,
                    extension: record.extension,
                    order: record.order,
                },
            ),
        );
        Ok(id)
    }

    async fn delete_image(&self, id: &RecordId) -> RecordResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(RecordError::Rejected {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        match self.records.lock().unwrap().remove(id.as_str()) {
            Some(_) => Ok(()),
            None => Err(RecordError::NotFound(id.clone())),
        }
    }

    async fn list_images(&self, owner_id: &OwnerId) -> RecordResult<Vec<ImageRecord>> {
        let mut records: Vec<ImageRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, record)| record.clone())
            .collect();
        records.sort_by_key(|record| record.order);
        Ok(records)
    }

    async fn update_orders(&self, _owner_id: &OwnerId, changes: &[OrderChange]) -> RecordResult<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(RecordError::Request("timeout".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        for change in changes {
            if let Some((_, record)) = records.get_mut(change.id.as_str()) {
                record.order = change.order;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    /// Fail grants for paths containing this text.
    grant_failure: Mutex<Option<String>>,
    /// Fail uploads for paths containing this text.
    upload_failure: Mutex<Option<String>>,
    pub fail_delete: AtomicBool,
    pub delete_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_grants_for(&self, fragment: &str) {
        *self.grant_failure.lock().unwrap() = Some(fragment.to_string());
    }

    pub fn fail_uploads_for(&self, fragment: &str) {
        *self.upload_failure.lock().unwrap() = Some(fragment.to_string());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .map(|(_, content_type)| content_type.clone())
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn put_object(&self, path: &str) {
        self.objects.lock().unwrap().insert(
            path.to_string(),
            (Bytes::from_static(b"stored"), "image/png".to_string()),
        );
    }

    fn matches(switch: &Mutex<Option<String>>, path: &str) -> bool {
        switch
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|fragment| path.contains(fragment))
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn request_write_grant(&self, path: &str) -> StorageResult<WriteGrant> {
        if Self::matches(&self.grant_failure, path) {
            return Err(StorageError::GrantFailed(format!("signing refused for {}", path)));
        }
        Ok(WriteGrant {
            path: path.to_string(),
            url: format!("memory://{}", path),
            expires_at: None,
        })
    }

    async fn upload(&self, grant: &WriteGrant, data: Bytes, content_type: &str) -> StorageResult<()> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if Self::matches(&self.upload_failure, &grant.path) {
            return Err(StorageError::UploadFailed(format!("{} rejected", grant.path)));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(grant.path.clone(), (data, content_type.to_string()));
        Ok(())
    }

    async fn delete_paths(&self, paths: &[String]) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("storage unavailable".to_string()));
        }
        let mut objects = self.objects.lock().unwrap();
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Returns a small payload per width without decoding anything.
#[derive(Default)]
pub struct FakeResizer {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeResizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let resizer = Self::default();
        resizer.fail.store(true, Ordering::SeqCst);
        resizer
    }
}

#[async_trait]
impl VariantResizer for FakeResizer {
    async fn resize(&self, source: &SourceFile, widths: &[u32]) -> ProcessingResult<Vec<ResizedImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProcessingError::UnsupportedFormat(source.file_name.clone()));
        }
        Ok(widths
            .iter()
            .map(|&width| ResizedImage {
                width,
                height: width / 2,
                data: Bytes::from(format!("{}@{}", source.file_name, width)),
                content_type: "image/png",
            })
            .collect())
    }
}
