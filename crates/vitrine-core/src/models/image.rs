use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use super::record::{ImageRecord, RecordId};
use crate::order::Sequenced;

/// Session-local identifier of a gallery entry. Used as the drag-and-drop key;
/// a fresh UUID per entry, so ids are never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        EntryId(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(EntryId(Uuid::parse_str(s)?))
    }
}

/// Lifecycle state of one gallery entry.
///
/// `Pending → Uploading → Processing → Success`, with `Error` reachable from the two
/// in-flight states and `Error → Pending` on retry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Uploading,
    Processing,
    Success,
    Error,
}

impl EntryStatus {
    /// An operation is running against the entry's remote state.
    pub fn is_in_flight(self) -> bool {
        matches!(self, EntryStatus::Uploading | EntryStatus::Processing)
    }
}

impl Display for EntryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EntryStatus::Pending => write!(f, "pending"),
            EntryStatus::Uploading => write!(f, "uploading"),
            EntryStatus::Processing => write!(f, "processing"),
            EntryStatus::Success => write!(f, "success"),
            EntryStatus::Error => write!(f, "error"),
        }
    }
}

impl FromStr for EntryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EntryStatus::Pending),
            "uploading" => Ok(EntryStatus::Uploading),
            "processing" => Ok(EntryStatus::Processing),
            "success" => Ok(EntryStatus::Success),
            "error" => Ok(EntryStatus::Error),
            _ => Err(anyhow::anyhow!("Invalid entry status: {}", s)),
        }
    }
}

/// A user-selected file, held in memory until its upload succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl SourceFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// File name without its last extension (`"summer.photo.png"` → `"summer.photo"`).
    pub fn stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }

    /// Lower-cased text after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        match self.file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_lowercase()),
            _ => None,
        }
    }
}

/// Where a thumbnail for the entry can be rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reference", rename_all = "lowercase")]
pub enum PreviewRef {
    /// The in-memory source file, by name; available before any upload.
    Local(String),
    /// A storage path of an already uploaded variant.
    Remote(String),
}

/// One image's local representation and lifecycle state.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEntry {
    pub id: EntryId,
    pub source: Option<SourceFile>,
    pub status: EntryStatus,
    pub preview: PreviewRef,
    pub remote_id: Option<RecordId>,
    pub basename: Option<String>,
    pub extension: Option<String>,
    pub order: i64,
    /// Order value currently stored on the durable record, if any.
    pub persisted_order: Option<i64>,
    pub processed_paths: Vec<String>,
    pub error_detail: Option<String>,
    pub is_persisted: bool,
    /// A removal got as far as deleting the stored files but the record survived.
    pub removal_failed: bool,
}

impl ImageEntry {
    /// A freshly added file, queued with no remote side effects.
    pub fn pending(source: SourceFile, order: i64) -> Self {
        Self {
            id: EntryId::new(),
            preview: PreviewRef::Local(source.file_name.clone()),
            source: Some(source),
            status: EntryStatus::Pending,
            remote_id: None,
            basename: None,
            extension: None,
            order,
            persisted_order: None,
            processed_paths: Vec::new(),
            error_detail: None,
            is_persisted: false,
            removal_failed: false,
        }
    }

    /// An entry rebuilt from a previously saved record.
    pub fn from_record(record: ImageRecord, preview_path: String, processed_paths: Vec<String>) -> Self {
        Self {
            id: EntryId::new(),
            source: None,
            status: EntryStatus::Success,
            preview: PreviewRef::Remote(preview_path),
            remote_id: Some(record.id),
            basename: Some(record.basename),
            extension: Some(record.extension),
            order: record.order,
            persisted_order: Some(record.order),
            processed_paths,
            error_detail: None,
            is_persisted: true,
            removal_failed: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_in_flight()
    }

    pub fn has_record(&self) -> bool {
        self.remote_id.is_some()
    }

    /// Only failed uploads of entries created in this session may be retried.
    /// An entry whose removal failed can only be removed again.
    pub fn is_retryable(&self) -> bool {
        self.status == EntryStatus::Error
            && !self.is_persisted
            && !self.removal_failed
            && self.source.is_some()
    }

    /// True when the entry satisfies everything `Success` promises.
    pub fn is_complete(&self, expected_variants: usize) -> bool {
        self.remote_id.as_ref().is_some_and(|id| !id.as_str().is_empty())
            && self.basename.as_deref().is_some_and(|b| !b.is_empty())
            && self.extension.as_deref().is_some_and(|e| !e.is_empty())
            && self.processed_paths.len() == expected_variants
    }

    /// The order value differs from what the record stores.
    pub fn has_unsaved_order(&self) -> bool {
        self.remote_id.is_some() && self.persisted_order != Some(self.order)
    }

    pub fn fail(&mut self, detail: impl Into<String>) {
        self.status = EntryStatus::Error;
        self.error_detail = Some(detail.into());
    }

    /// Record a removal whose stored files are gone but whose record delete failed.
    pub fn fail_removal(&mut self, detail: impl Into<String>) {
        self.fail(detail);
        self.removal_failed = true;
        self.processed_paths.clear();
    }

    /// Forget the remote identity after its record was deleted.
    pub fn clear_remote(&mut self) {
        self.remote_id = None;
        self.basename = None;
        self.extension = None;
        self.persisted_order = None;
        self.processed_paths.clear();
    }
}

impl Sequenced for ImageEntry {
    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}
