//! Image manager: owns the gallery's entries and drives every remote side effect.
//!
//! Forward transitions run as a saga (record, original, variants) with compensating
//! deletes on failure. Entry state lives behind a single mutex that is never held
//! across an await; operations that span awaits hold a [`Claim`] on their entry so
//! concurrent calls on it are rejected instead of interleaved.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::watch;

use vitrine_core::models::{
    EntryId, EntryStatus, ImageEntry, ImageRecord, NewImageRecord, OrderChange, OwnerId,
    PreviewRef, RecordId, SourceFile,
};
use vitrine_core::order::{append_order, move_item, rebalance};
use vitrine_core::{PipelineError, PipelineResult, PipelineStep, RecordError, RecordGateway};
use vitrine_processing::{content_type_for_extension, ImageResizer, ImageValidator, VariantResizer};
use vitrine_storage::{derive_paths, ImagePaths, RemoteStore};

use crate::basename::BasenameAllocator;
use crate::scheduler::UploadScheduler;
use crate::settings::ManagerSettings;

/// A selected file that was not added to the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddFilesOutcome {
    pub added: Vec<EntryId>,
    pub rejected: Vec<RejectedFile>,
}

/// Result of one [`ImageManager::upload_all`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Another `upload_all` was already running; nothing was done.
    pub skipped: bool,
}

impl UploadSummary {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct GalleryState {
    entries: Vec<ImageEntry>,
    /// Entries with an operation in progress, including ones still waiting for a slot.
    claimed: HashSet<EntryId>,
}

impl GalleryState {
    fn position(&self, id: EntryId) -> PipelineResult<usize> {
        self.entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(PipelineError::EntryNotFound(id))
    }
}

enum QueuedOutcome {
    Succeeded,
    Failed,
    Skipped,
}

/// What the upload saga managed to do before failing.
#[derive(Default)]
struct SagaProgress {
    record_reused: bool,
    uploaded: Vec<String>,
}

struct SagaFailure {
    step: PipelineStep,
    error: PipelineError,
    progress: SagaProgress,
}

/// Error detail of an entry whose upload future was dropped before it finished.
pub const INTERRUPTED_DETAIL: &str = "interrupted: upload did not finish";

/// Exclusive hold on one entry for an operation that spans awaits.
///
/// Dropping it releases the entry. If the entry is still uploading at that point
/// the operation was cancelled, and the entry moves to `Error` so it can be
/// retried or removed.
struct Claim<'a> {
    manager: &'a ImageManager,
    id: EntryId,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        let mut state = self.manager.lock_state();
        state.claimed.remove(&self.id);

        let Ok(index) = state.position(self.id) else {
            return;
        };
        let entry = &mut state.entries[index];
        if entry.is_busy() {
            tracing::warn!(entry_id = %self.id, status = %entry.status, "Upload interrupted");
            entry.fail(INTERRUPTED_DETAIL);
            self.manager.publish(&state);
        }
    }
}

/// Clears the single-flight flag when `upload_all` returns.
struct FlagReset<'a>(&'a AtomicBool);

impl Drop for FlagReset<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ImageManager {
    owner_id: OwnerId,
    gateway: Arc<dyn RecordGateway>,
    store: Arc<dyn RemoteStore>,
    resizer: Arc<dyn VariantResizer>,
    scheduler: Arc<UploadScheduler>,
    validator: ImageValidator,
    settings: ManagerSettings,
    basenames: BasenameAllocator,
    state: Mutex<GalleryState>,
    uploading_all: AtomicBool,
    changes: watch::Sender<Vec<ImageEntry>>,
}

impl ImageManager {
    pub fn new(
        owner_id: OwnerId,
        gateway: Arc<dyn RecordGateway>,
        store: Arc<dyn RemoteStore>,
        scheduler: Arc<UploadScheduler>,
        settings: ManagerSettings,
    ) -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            owner_id,
            gateway,
            store,
            resizer: Arc::new(ImageResizer::new(settings.encode_quality)),
            scheduler,
            validator: ImageValidator::with_max_size(settings.max_file_size_bytes),
            settings,
            basenames: BasenameAllocator::new(),
            state: Mutex::new(GalleryState::default()),
            uploading_all: AtomicBool::new(false),
            changes,
        }
    }

    /// Replace the variant generator.
    pub fn with_resizer(mut self, resizer: Arc<dyn VariantResizer>) -> Self {
        self.resizer = resizer;
        self
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn scheduler(&self) -> &Arc<UploadScheduler> {
        &self.scheduler
    }

    /// Receive the full entry list after every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ImageEntry>> {
        self.changes.subscribe()
    }

    fn lock_state(&self) -> MutexGuard<'_, GalleryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &GalleryState) {
        self.changes.send_replace(state.entries.clone());
    }

    fn paths_for(&self, basename: &str, extension: &str) -> ImagePaths {
        derive_paths(&self.owner_id, basename, extension, &self.settings.target_widths)
    }

    /// Storage paths of an entry that has a basename and extension.
    fn entry_paths(&self, entry: &ImageEntry) -> Option<ImagePaths> {
        match (entry.basename.as_deref(), entry.extension.as_deref()) {
            (Some(basename), Some(extension)) => Some(self.paths_for(basename, extension)),
            _ => None,
        }
    }

    /// Apply `f` to one entry and notify subscribers.
    fn with_entry<R>(&self, id: EntryId, f: impl FnOnce(&mut ImageEntry) -> R) -> PipelineResult<R> {
        let mut state = self.lock_state();
        let index = state.position(id)?;
        let result = f(&mut state.entries[index]);
        self.publish(&state);
        Ok(result)
    }

    /// Reserve an entry for an operation that spans awaits.
    fn claim(
        &self,
        id: EntryId,
        action: &'static str,
        allowed: impl FnOnce(&ImageEntry) -> bool,
    ) -> PipelineResult<(ImageEntry, Claim<'_>)> {
        let mut state = self.lock_state();
        let index = state.position(id)?;
        let entry = &state.entries[index];

        if state.claimed.contains(&id) || entry.is_busy() {
            return Err(PipelineError::EntryBusy {
                id,
                status: entry.status,
            });
        }
        if !allowed(entry) {
            return Err(PipelineError::InvalidTransition {
                id,
                status: entry.status,
                action,
            });
        }

        let entry = entry.clone();
        state.claimed.insert(id);
        drop(state);
        Ok((entry, Claim { manager: self, id }))
    }

    /// Seed the gallery with previously saved records.
    ///
    /// Records already present are skipped. Entries are sorted by order and
    /// rebalanced if the stored values are not strictly increasing. Returns the
    /// number of entries added.
    pub async fn load_existing(&self, records: Vec<ImageRecord>) -> usize {
        let mut state = self.lock_state();
        let known: HashSet<RecordId> = state
            .entries
            .iter()
            .filter_map(|entry| entry.remote_id.clone())
            .collect();

        let mut loaded = 0;
        for record in records {
            if known.contains(&record.id) {
                continue;
            }
            let paths = self.paths_for(&record.basename, &record.extension);
            let preview = paths
                .preview()
                .map(str::to_string)
                .unwrap_or_else(|| paths.original.clone());
            state
                .entries
                .push(ImageEntry::from_record(record, preview, paths.resized));
            loaded += 1;
        }

        state.entries.sort_by_key(|entry| entry.order);
        let rebalanced = rebalance(&mut state.entries);
        if !rebalanced.is_empty() {
            tracing::debug!(
                owner_id = %self.owner_id,
                rebalanced = rebalanced.len(),
                "Rebalanced stored image orders"
            );
        }

        self.publish(&state);
        loaded
    }

    /// Fetch the owner's saved records and load them.
    pub async fn load_from_gateway(&self) -> PipelineResult<usize> {
        let records = self.gateway.list_images(&self.owner_id).await?;
        Ok(self.load_existing(records).await)
    }

    /// Queue selected files. Unaccepted files are reported, not added.
    pub async fn add_files(&self, files: Vec<SourceFile>) -> AddFilesOutcome {
        let mut outcome = AddFilesOutcome::default();
        let mut state = self.lock_state();

        for mut file in files {
            if file.content_type.trim().is_empty() {
                if let Some(content_type) =
                    file.extension().as_deref().and_then(content_type_for_extension)
                {
                    file.content_type = content_type.to_string();
                }
            }

            if let Err(e) = self
                .validator
                .validate_all(&file.file_name, &file.content_type, file.len())
            {
                tracing::debug!(file_name = %file.file_name, error = %e, "Rejected selected file");
                outcome.rejected.push(RejectedFile {
                    file_name: file.file_name,
                    reason: e.to_string(),
                });
                continue;
            }

            let order = append_order(state.entries.last().map(|entry| entry.order));
            let entry = ImageEntry::pending(file, order);
            outcome.added.push(entry.id);
            state.entries.push(entry);
        }

        if !outcome.added.is_empty() {
            self.publish(&state);
        }
        tracing::info!(
            owner_id = %self.owner_id,
            added = outcome.added.len(),
            rejected = outcome.rejected.len(),
            "Files added to gallery"
        );
        outcome
    }

    /// Remove an entry and everything stored for it.
    ///
    /// Storage objects are deleted before the record. If that fails the entry is
    /// left untouched; if the record delete fails the entry moves to `Error` and
    /// can only be removed again.
    #[tracing::instrument(skip(self), fields(owner_id = %self.owner_id))]
    pub async fn remove_entry(&self, id: EntryId) -> PipelineResult<()> {
        let (entry, _claim) = {
            let mut state = self.lock_state();
            let index = state.position(id)?;
            let entry = &state.entries[index];

            if state.claimed.contains(&id) || entry.is_busy() {
                return Err(PipelineError::EntryBusy {
                    id,
                    status: entry.status,
                });
            }

            if !entry.has_record() {
                state.entries.remove(index);
                self.publish(&state);
                tracing::debug!(entry_id = %id, "Removed local entry");
                return Ok(());
            }

            let entry = entry.clone();
            state.claimed.insert(id);
            (entry, Claim { manager: self, id })
        };

        self.remove_remote(&entry).await
    }

    async fn remove_remote(&self, entry: &ImageEntry) -> PipelineResult<()> {
        let id = entry.id;
        let Some(record_id) = entry.remote_id.clone() else {
            return Ok(());
        };

        if let Some(paths) = self.entry_paths(entry) {
            if let Err(e) = self.store.delete_paths(&paths.all()).await {
                tracing::error!(entry_id = %id, record_id = %record_id, error = %e, "Failed to delete stored images");
                return Err(PipelineError::StorageDelete(e.to_string()));
            }
        }

        match self.gateway.delete_image(&record_id).await {
            Ok(()) | Err(RecordError::NotFound(_)) => {
                let mut state = self.lock_state();
                if let Ok(index) = state.position(id) {
                    state.entries.remove(index);
                }
                self.publish(&state);
                tracing::info!(entry_id = %id, record_id = %record_id, "Image removed");
                Ok(())
            }
            Err(e) => {
                tracing::error!(entry_id = %id, record_id = %record_id, error = %e, "Failed to delete image record");
                let detail = format!("{}: {}", PipelineStep::DeleteRecord, e);
                self.with_entry(id, |entry| entry.fail_removal(detail))?;
                Err(PipelineError::Record(e))
            }
        }
    }

    /// Run the upload saga for one pending entry.
    ///
    /// Pipeline failures end up in the returned entry's state; `Err` is only
    /// returned when the entry cannot be uploaded at all.
    #[tracing::instrument(skip(self), fields(owner_id = %self.owner_id))]
    pub async fn upload_one(&self, id: EntryId) -> PipelineResult<ImageEntry> {
        let (_, _claim) = self.claim(id, "upload", |entry| entry.status == EntryStatus::Pending)?;
        self.scheduler.run(self.drive(id, false)).await
    }

    /// Discard a failed upload's leftovers and upload it again.
    #[tracing::instrument(skip(self), fields(owner_id = %self.owner_id))]
    pub async fn retry_entry(&self, id: EntryId) -> PipelineResult<ImageEntry> {
        let (_, _claim) = self.claim(id, "retry", ImageEntry::is_retryable)?;
        self.scheduler.run(self.drive(id, true)).await
    }

    /// Upload every pending and retryable entry, in display order.
    ///
    /// Only one call runs at a time; an overlapping call returns
    /// [`UploadSummary::skipped`]. Entry failures are independent.
    #[tracing::instrument(skip(self), fields(owner_id = %self.owner_id))]
    pub async fn upload_all(&self) -> UploadSummary {
        if self.uploading_all.swap(true, Ordering::SeqCst) {
            tracing::debug!("Upload already in progress");
            return UploadSummary::skipped();
        }
        let _reset = FlagReset(&self.uploading_all);

        let ids: Vec<EntryId> = {
            let state = self.lock_state();
            state
                .entries
                .iter()
                .filter(|entry| !state.claimed.contains(&entry.id))
                .filter(|entry| entry.status == EntryStatus::Pending || entry.is_retryable())
                .map(|entry| entry.id)
                .collect()
        };

        let start = Instant::now();
        let outcomes = join_all(
            ids.iter()
                .map(|&id| self.scheduler.run(self.process_queued(id))),
        )
        .await;

        let mut summary = UploadSummary::default();
        for outcome in outcomes {
            match outcome {
                QueuedOutcome::Succeeded => {
                    summary.attempted += 1;
                    summary.succeeded += 1;
                }
                QueuedOutcome::Failed => {
                    summary.attempted += 1;
                    summary.failed += 1;
                }
                QueuedOutcome::Skipped => {}
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload batch finished"
        );
        summary
    }

    /// Claim and upload one queued entry. Entries removed or claimed while waiting
    /// for a slot are skipped.
    async fn process_queued(&self, id: EntryId) -> QueuedOutcome {
        let (entry, _claim) = match self.claim(id, "upload", |entry| {
            entry.status == EntryStatus::Pending || entry.is_retryable()
        }) {
            Ok(claimed) => claimed,
            Err(e) => {
                tracing::debug!(entry_id = %id, error = %e, "Skipping queued entry");
                return QueuedOutcome::Skipped;
            }
        };

        match self.drive(id, entry.status == EntryStatus::Error).await {
            Ok(entry) if entry.status == EntryStatus::Success => QueuedOutcome::Succeeded,
            Ok(_) => QueuedOutcome::Failed,
            Err(e) => {
                tracing::warn!(entry_id = %id, error = %e, "Queued upload did not run");
                QueuedOutcome::Failed
            }
        }
    }

    /// Upload a claimed entry, discarding earlier leftovers first when retrying.
    async fn drive(&self, id: EntryId, retry: bool) -> PipelineResult<ImageEntry> {
        if retry {
            self.discard_partial(id).await?;
        }
        self.run_upload(id).await
    }

    /// Best-effort removal of what a failed attempt left behind, then back to `Pending`.
    async fn discard_partial(&self, id: EntryId) -> PipelineResult<()> {
        let entry = self.with_entry(id, |entry| entry.clone())?;

        if let Some(record_id) = entry.remote_id.clone() {
            if let Some(paths) = self.entry_paths(&entry) {
                if let Err(e) = self.store.delete_paths(&paths.all()).await {
                    tracing::warn!(entry_id = %id, error = %e, "Failed to discard partial uploads");
                }
            }

            match self.gateway.delete_image(&record_id).await {
                Ok(()) | Err(RecordError::NotFound(_)) => {
                    self.with_entry(id, ImageEntry::clear_remote)?;
                }
                Err(e) => {
                    tracing::warn!(
                        entry_id = %id,
                        record_id = %record_id,
                        error = %e,
                        "Failed to discard record, it will be reused"
                    );
                }
            }
        }

        self.with_entry(id, |entry| {
            entry.status = EntryStatus::Pending;
            entry.error_detail = None;
        })
    }

    async fn run_upload(&self, id: EntryId) -> PipelineResult<ImageEntry> {
        let entry = self
            .with_entry(id, |entry| {
                entry.status = EntryStatus::Uploading;
                entry.error_detail = None;
                entry.clone()
            })?;
        let start = Instant::now();

        match self.upload_saga(&entry).await {
            Ok(paths) => {
                let uploaded = self
                    .with_entry(id, |entry| {
                        entry.status = EntryStatus::Success;
                        if let Some(preview) = paths.preview() {
                            entry.preview = PreviewRef::Remote(preview.to_string());
                        }
                        entry.processed_paths = paths.resized;
                        entry.clone()
                    })?;
                tracing::info!(
                    entry_id = %id,
                    record_id = ?uploaded.remote_id.as_ref().map(RecordId::as_str),
                    variants = uploaded.processed_paths.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Image uploaded"
                );
                Ok(uploaded)
            }
            Err(failure) => {
                tracing::warn!(
                    entry_id = %id,
                    step = %failure.step,
                    error = %failure.error,
                    "Image upload failed"
                );
                self.compensate(id, failure.progress).await;
                let detail = format!("{}: {}", failure.step, failure.error);
                self.with_entry(id, |entry| {
                    entry.fail(detail);
                    entry.clone()
                })
            }
        }
    }

    /// Create the record, upload the original, resize, upload the variants.
    async fn upload_saga(&self, entry: &ImageEntry) -> Result<ImagePaths, SagaFailure> {
        let mut progress = SagaProgress::default();

        let Some(source) = entry.source.as_ref() else {
            return Err(SagaFailure {
                step: PipelineStep::Resize,
                error: PipelineError::Format("source file is no longer available".to_string()),
                progress,
            });
        };

        let (basename, extension) = match (&entry.remote_id, &entry.basename, &entry.extension) {
            (Some(_), Some(basename), Some(extension)) => {
                progress.record_reused = true;
                (basename.clone(), extension.clone())
            }
            _ => match self.create_record(entry, source).await {
                Ok(created) => created,
                Err(error) => {
                    return Err(SagaFailure {
                        step: PipelineStep::CreateRecord,
                        error,
                        progress,
                    })
                }
            },
        };

        let paths = self.paths_for(&basename, &extension);
        let content_type = if source.content_type.is_empty() {
            content_type_for_extension(&extension).unwrap_or("application/octet-stream")
        } else {
            source.content_type.as_str()
        };

        if let Err(error) = self
            .put(&paths.original, source.data.clone(), content_type)
            .await
        {
            return Err(SagaFailure {
                step: PipelineStep::UploadOriginal,
                error,
                progress,
            });
        }
        progress.uploaded.push(paths.original.clone());

        if let Err(error) = self.with_entry(entry.id, |entry| entry.status = EntryStatus::Processing) {
            return Err(SagaFailure {
                step: PipelineStep::Resize,
                error,
                progress,
            });
        }

        let variants = match self
            .resizer
            .resize(source, &self.settings.target_widths)
            .await
        {
            Ok(variants) if variants.len() == paths.resized.len() => variants,
            Ok(variants) => {
                return Err(SagaFailure {
                    step: PipelineStep::Resize,
                    error: PipelineError::Format(format!(
                        "expected {} variants, got {}",
                        paths.resized.len(),
                        variants.len()
                    )),
                    progress,
                })
            }
            Err(e) => {
                return Err(SagaFailure {
                    step: PipelineStep::Resize,
                    error: PipelineError::Format(e.to_string()),
                    progress,
                })
            }
        };

        for (path, variant) in paths.resized.iter().zip(variants) {
            if let Err(error) = self.put(path, variant.data, variant.content_type).await {
                return Err(SagaFailure {
                    step: PipelineStep::UploadVariant,
                    error,
                    progress,
                });
            }
            progress.uploaded.push(path.clone());
        }

        Ok(paths)
    }

    /// Create the durable record and remember its identity on the entry.
    async fn create_record(
        &self,
        entry: &ImageEntry,
        source: &SourceFile,
    ) -> PipelineResult<(String, String)> {
        let extension = source
            .extension()
            .ok_or_else(|| PipelineError::Format(format!("{} has no extension", source.file_name)))?;
        let basename = self.basenames.next(source.stem());

        // Positions may have moved while the entry waited for a slot.
        let order = self.with_entry(entry.id, |entry| entry.order)?;

        let record_id = self
            .gateway
            .create_image(NewImageRecord {
                owner_id: self.owner_id.clone(),
                basename: basename.clone(),
                extension: extension.clone(),
                order,
            })
            .await?;

        tracing::debug!(entry_id = %entry.id, record_id = %record_id, basename = %basename, "Image record created");

        let (stored_basename, stored_extension) = (basename.clone(), extension.clone());
        self.with_entry(entry.id, move |entry| {
            entry.remote_id = Some(record_id);
            entry.basename = Some(stored_basename);
            entry.extension = Some(stored_extension);
            entry.persisted_order = Some(order);
        })?;

        Ok((basename, extension))
    }

    /// Grant, then upload.
    async fn put(&self, path: &str, data: bytes::Bytes, content_type: &str) -> PipelineResult<()> {
        let grant = self
            .store
            .request_write_grant(path)
            .await
            .map_err(|e| PipelineError::grant(path, e))?;
        self.store
            .upload(&grant, data, content_type)
            .await
            .map_err(|e| PipelineError::upload(path, e))
    }

    /// Undo a failed saga: stored objects first, then the entry's record. Failures
    /// here are logged only.
    async fn compensate(&self, id: EntryId, progress: SagaProgress) {
        let Ok(entry) = self.with_entry(id, |entry| entry.clone()) else {
            return;
        };
        let Some(record_id) = entry.remote_id.clone() else {
            return;
        };

        let to_delete = if progress.record_reused {
            self.entry_paths(&entry)
                .map(|paths| paths.all())
                .unwrap_or_default()
        } else {
            progress.uploaded
        };

        if !to_delete.is_empty() {
            if let Err(e) = self.store.delete_paths(&to_delete).await {
                tracing::warn!(entry_id = %id, error = %e, "Rollback of stored images failed");
            }
        }

        match self.gateway.delete_image(&record_id).await {
            Ok(()) | Err(RecordError::NotFound(_)) => {
                if let Err(e) = self.with_entry(id, ImageEntry::clear_remote) {
                    tracing::debug!(entry_id = %id, error = %e, "Entry left before rollback finished");
                }
                tracing::debug!(entry_id = %id, record_id = %record_id, "Rolled back image record");
            }
            Err(e) => {
                tracing::warn!(
                    entry_id = %id,
                    record_id = %record_id,
                    error = %e,
                    "Rollback of image record failed"
                );
            }
        }
    }

    /// Move the entry at `from` to `to`. Orders are saved by [`Self::save_orders`].
    pub async fn reorder(&self, from: usize, to: usize) -> PipelineResult<Vec<ImageEntry>> {
        let mut state = self.lock_state();
        let len = state.entries.len();
        for index in [from, to] {
            if index >= len {
                return Err(PipelineError::IndexOutOfRange { index, len });
            }
        }

        let changed = move_item(&mut state.entries, from, to);
        if !changed.is_empty() {
            self.publish(&state);
        }
        tracing::debug!(from, to, changed = changed.len(), "Reordered gallery");
        Ok(state.entries.clone())
    }

    pub async fn snapshot(&self) -> Vec<ImageEntry> {
        self.lock_state().entries.clone()
    }

    pub async fn entry(&self, id: EntryId) -> Option<ImageEntry> {
        let state = self.lock_state();
        state.entries.iter().find(|entry| entry.id == id).cloned()
    }

    /// Successfully stored images in display order, as the product form saves them.
    pub async fn processed_images(&self) -> Vec<ImageRecord> {
        let state = self.lock_state();
        state
            .entries
            .iter()
            .filter(|entry| entry.status == EntryStatus::Success)
            .filter_map(|entry| {
                Some(ImageRecord {
                    id: entry.remote_id.clone()?,
                    basename: entry.basename.clone()?,
                    extension: entry.extension.clone()?,
                    order: entry.order,
                })
            })
            .collect()
    }

    /// Records whose order differs from the stored value.
    pub async fn order_changes(&self) -> Vec<OrderChange> {
        let state = self.lock_state();
        state
            .entries
            .iter()
            .filter(|entry| entry.has_unsaved_order())
            .filter_map(|entry| {
                Some(OrderChange {
                    id: entry.remote_id.clone()?,
                    order: entry.order,
                })
            })
            .collect()
    }

    /// Persist changed order values. Returns the number of records updated.
    #[tracing::instrument(skip(self), fields(owner_id = %self.owner_id))]
    pub async fn save_orders(&self) -> PipelineResult<usize> {
        let changes = self.order_changes().await;
        if changes.is_empty() {
            return Ok(0);
        }

        self.gateway
            .update_orders(&self.owner_id, &changes)
            .await?;

        let mut state = self.lock_state();
        for change in &changes {
            if let Some(entry) = state
                .entries
                .iter_mut()
                .find(|entry| entry.remote_id.as_ref() == Some(&change.id))
            {
                entry.persisted_order = Some(change.order);
            }
        }
        self.publish(&state);

        tracing::info!(updated = changes.len(), "Saved image order");
        Ok(changes.len())
    }
}
