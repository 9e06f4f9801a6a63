//! Error types module
//!
//! All failures of the image pipeline are unified under [`PipelineError`]. The first
//! five variants form the pipeline taxonomy (grant, upload, format, record, storage
//! delete); the rest are usage errors raised by the image manager when an operation
//! does not apply to an entry in its current state.
//!
//! Collaborator crates keep their own error types (`StorageError`, [`RecordError`])
//! and convert at the seam, so the manager never depends on transport details.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::gateway::RecordError;
use crate::models::{EntryId, EntryStatus};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like rejected operations
    Debug,
    /// Warning level - for failures the user can retry
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Saga step that produced a failure. Stored alongside the entry's error detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    CreateRecord,
    UploadOriginal,
    Resize,
    UploadVariant,
    DeleteStorage,
    DeleteRecord,
}

impl Display for PipelineStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PipelineStep::CreateRecord => write!(f, "create record"),
            PipelineStep::UploadOriginal => write!(f, "upload original"),
            PipelineStep::Resize => write!(f, "resize"),
            PipelineStep::UploadVariant => write!(f, "upload variant"),
            PipelineStep::DeleteStorage => write!(f, "delete storage"),
            PipelineStep::DeleteRecord => write!(f, "delete record"),
        }
    }
}

/// Metadata describing how an error should be presented and handled.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "GRANT_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same operation may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to obtain upload authorization for {path}: {message}")]
    Grant { path: String, message: String },

    #[error("Failed to upload {path}: {message}")]
    Upload { path: String, message: String },

    #[error("Unsupported image: {0}")]
    Format(String),

    #[error("Image record error: {0}")]
    Record(#[from] RecordError),

    #[error("Failed to delete stored files: {0}")]
    StorageDelete(String),

    #[error("Image entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("Image entry {id} is busy ({status})")]
    EntryBusy { id: EntryId, status: EntryStatus },

    #[error("Cannot {action} image entry {id} while it is {status}")]
    InvalidTransition {
        id: EntryId,
        status: EntryStatus,
        action: &'static str,
    },

    #[error("Index {index} out of range for {len} images")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub fn grant(path: impl Into<String>, message: impl Display) -> Self {
        PipelineError::Grant {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn upload(path: impl Into<String>, message: impl Display) -> Self {
        PipelineError::Upload {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            PipelineError::Grant { .. } => "GrantError",
            PipelineError::Upload { .. } => "UploadError",
            PipelineError::Format(_) => "FormatError",
            PipelineError::Record(_) => "RecordError",
            PipelineError::StorageDelete(_) => "StorageDeleteError",
            PipelineError::EntryNotFound(_) => "EntryNotFound",
            PipelineError::EntryBusy { .. } => "EntryBusy",
            PipelineError::InvalidTransition { .. } => "InvalidTransition",
            PipelineError::IndexOutOfRange { .. } => "IndexOutOfRange",
            PipelineError::Config(_) => "Config",
        }
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn pipeline_error_static_metadata(
    err: &PipelineError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        PipelineError::Grant { .. } => (
            "GRANT_ERROR",
            true,
            Some("Check the connection and retry the image"),
            LogLevel::Warn,
        ),
        PipelineError::Upload { .. } => (
            "UPLOAD_ERROR",
            true,
            Some("Retry the image; reduce its size if the limit was exceeded"),
            LogLevel::Warn,
        ),
        PipelineError::Format(_) => (
            "FORMAT_ERROR",
            false,
            Some("Use a JPEG, PNG or WebP image"),
            LogLevel::Debug,
        ),
        PipelineError::Record(_) => (
            "RECORD_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        PipelineError::StorageDelete(_) => (
            "STORAGE_DELETE_ERROR",
            true,
            Some("Retry the removal after a short delay"),
            LogLevel::Error,
        ),
        PipelineError::EntryNotFound(_) => (
            "ENTRY_NOT_FOUND",
            false,
            Some("Refresh the gallery"),
            LogLevel::Debug,
        ),
        PipelineError::EntryBusy { .. } => (
            "ENTRY_BUSY",
            true,
            Some("Wait for the current upload to finish"),
            LogLevel::Debug,
        ),
        PipelineError::InvalidTransition { .. } => (
            "INVALID_TRANSITION",
            false,
            None,
            LogLevel::Debug,
        ),
        PipelineError::IndexOutOfRange { .. } => (
            "INDEX_OUT_OF_RANGE",
            false,
            None,
            LogLevel::Debug,
        ),
        PipelineError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check VITRINE_* environment variables"),
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        pipeline_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        pipeline_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        pipeline_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        pipeline_error_static_metadata(self).3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_grant() {
        let err = PipelineError::grant("p1/original/a.png", "connection refused");
        assert_eq!(err.error_code(), "GRANT_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert_eq!(err.error_type(), "GrantError");
        assert!(err.to_string().contains("p1/original/a.png"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_error_metadata_format_is_not_recoverable() {
        let err = PipelineError::Format("gif is not supported".to_string());
        assert_eq!(err.error_code(), "FORMAT_ERROR");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_record_error_converts() {
        let err: PipelineError = RecordError::Request("timeout".to_string()).into();
        assert_eq!(err.error_code(), "RECORD_ERROR");
        assert_eq!(err.error_type(), "RecordError");
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_busy_message_includes_status() {
        let id = EntryId::new();
        let err = PipelineError::EntryBusy {
            id,
            status: EntryStatus::Uploading,
        };
        assert!(err.to_string().contains("uploading"));
        assert_eq!(
            err.suggested_action(),
            Some("Wait for the current upload to finish")
        );
    }

    #[test]
    fn test_step_display() {
        assert_eq!(PipelineStep::UploadOriginal.to_string(), "upload original");
        assert_eq!(PipelineStep::DeleteRecord.to_string(), "delete record");
    }
}
