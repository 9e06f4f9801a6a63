//! [`RecordGateway`] over the storefront API.

use crate::{ApiClient, StatusError};
use async_trait::async_trait;
use vitrine_core::models::{ImageRecord, NewImageRecord, OrderChange, OwnerId, RecordId};
use vitrine_core::{RecordError, RecordGateway, RecordResult};

fn record_error(err: anyhow::Error) -> RecordError {
    match err.downcast_ref::<StatusError>() {
        Some(status) => RecordError::Rejected {
            status: status.status,
            message: status.message.clone(),
        },
        None => RecordError::Request(format!("{:#}", err)),
    }
}

#[async_trait]
impl RecordGateway for ApiClient {
    async fn create_image(&self, record: NewImageRecord) -> RecordResult<RecordId> {
        let id = self.add_image(&record).await.map_err(record_error)?;
        if id.as_str().is_empty() {
            return Err(RecordError::InvalidResponse(
                "image record created without an id".to_string(),
            ));
        }

        tracing::debug!(record_id = %id, basename = %record.basename, "Created image record");
        Ok(id)
    }

    async fn delete_image(&self, id: &RecordId) -> RecordResult<()> {
        match ApiClient::delete_image(self, id).await {
            Ok(()) => Ok(()),
            Err(err) if crate::status_of(&err) == Some(404) => Err(RecordError::NotFound(id.clone())),
            Err(err) => Err(record_error(err)),
        }
    }

    async fn list_images(&self, owner_id: &OwnerId) -> RecordResult<Vec<ImageRecord>> {
        self.list_product_images(owner_id)
            .await
            .map_err(record_error)
    }

    async fn update_orders(&self, owner_id: &OwnerId, changes: &[OrderChange]) -> RecordResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        self.reorder_images(owner_id, changes)
            .await
            .map_err(record_error)
    }
}
