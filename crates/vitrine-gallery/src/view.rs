//! Read-only gallery tiles and the intents a user can emit on them.

use std::sync::Arc;

use vitrine_core::models::{EntryId, EntryStatus, ImageEntry, PreviewRef, SourceFile};
use vitrine_core::PipelineResult;

use crate::manager::{AddFilesOutcome, ImageManager};

/// One rendered gallery cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryTile {
    pub id: EntryId,
    pub position: usize,
    pub order: i64,
    pub status: EntryStatus,
    pub status_label: &'static str,
    pub preview: PreviewRef,
    pub error: Option<String>,
    pub can_retry: bool,
    pub can_remove: bool,
}

fn status_label(status: EntryStatus) -> &'static str {
    match status {
        EntryStatus::Pending => "Waiting",
        EntryStatus::Uploading => "Uploading",
        EntryStatus::Processing => "Processing",
        EntryStatus::Success => "Uploaded",
        EntryStatus::Error => "Failed",
    }
}

#[derive(Debug, Clone)]
pub enum GalleryIntent {
    AddFiles(Vec<SourceFile>),
    Remove(EntryId),
    Retry(EntryId),
    /// A drag ended with `active` dropped over `over` (nothing when dropped outside).
    DragEnd {
        active: EntryId,
        over: Option<EntryId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    Added(AddFilesOutcome),
    Removed(EntryId),
    Retried(ImageEntry),
    Reordered(Vec<GalleryTile>),
    Ignored,
}

/// Translates user intents into manager calls. Holds no state of its own.
#[derive(Clone)]
pub struct GalleryView {
    manager: Arc<ImageManager>,
}

impl GalleryView {
    pub fn new(manager: Arc<ImageManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<ImageManager> {
        &self.manager
    }

    pub fn render(entries: &[ImageEntry]) -> Vec<GalleryTile> {
        entries
            .iter()
            .enumerate()
            .map(|(position, entry)| GalleryTile {
                id: entry.id,
                position,
                order: entry.order,
                status: entry.status,
                status_label: status_label(entry.status),
                preview: entry.preview.clone(),
                error: entry.error_detail.clone(),
                can_retry: entry.is_retryable(),
                can_remove: !entry.is_busy(),
            })
            .collect()
    }

    pub async fn tiles(&self) -> Vec<GalleryTile> {
        Self::render(&self.manager.snapshot().await)
    }

    pub async fn dispatch(&self, intent: GalleryIntent) -> PipelineResult<IntentOutcome> {
        match intent {
            GalleryIntent::AddFiles(files) => {
                Ok(IntentOutcome::Added(self.manager.add_files(files).await))
            }
            GalleryIntent::Remove(id) => {
                self.manager.remove_entry(id).await?;
                Ok(IntentOutcome::Removed(id))
            }
            GalleryIntent::Retry(id) => {
                Ok(IntentOutcome::Retried(self.manager.retry_entry(id).await?))
            }
            GalleryIntent::DragEnd { active, over } => {
                let Some(over) = over.filter(|over| *over != active) else {
                    return Ok(IntentOutcome::Ignored);
                };

                let entries = self.manager.snapshot().await;
                let index_of = |id: EntryId| entries.iter().position(|entry| entry.id == id);
                let (Some(from), Some(to)) = (index_of(active), index_of(over)) else {
                    tracing::debug!(active = %active, over = %over, "Drag ended on an unknown tile");
                    return Ok(IntentOutcome::Ignored);
                };

                let entries = self.manager.reorder(from, to).await?;
                Ok(IntentOutcome::Reordered(Self::render(&entries)))
            }
        }
    }
}
