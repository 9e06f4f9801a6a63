//! Record gateway trait
//!
//! The durable image record (one database row per image) anchors a stored file to its
//! product and its gallery position. The persistence API that owns those rows is an
//! external collaborator; this trait is the narrow interface the image manager uses.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ImageRecord, NewImageRecord, OrderChange, OwnerId, RecordId};

/// Record gateway errors
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Record not found: {0}")]
    NotFound(RecordId),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for record gateway operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Persistence API for image records.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Create a record and return its id.
    async fn create_image(&self, record: NewImageRecord) -> RecordResult<RecordId>;

    /// Delete a record by id.
    async fn delete_image(&self, id: &RecordId) -> RecordResult<()>;

    /// List the records of an owner, ordered by `order` ascending.
    async fn list_images(&self, owner_id: &OwnerId) -> RecordResult<Vec<ImageRecord>>;

    /// Write new order values for existing records.
    async fn update_orders(&self, owner_id: &OwnerId, changes: &[OrderChange])
        -> RecordResult<()>;
}
