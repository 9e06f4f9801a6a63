//! Routes of the storefront API used by the image pipeline.
//!
//! Payload shapes match the API handlers: camelCase field names, bare ids.

use crate::ApiClient;
use anyhow::{Context, Result};
use vitrine_core::models::{ImageRecord, NewImageRecord, OrderChange, OwnerId, RecordId};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SignedUploadRequest {
    pub path: String,
}

/// Signed upload URL for one storage path.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SignedUploadResponse {
    pub url: String,
    pub path: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct AddImageResponse {
    pub id: RecordId,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DeleteImageRequest {
    pub id: RecordId,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DeleteStorageRequest {
    pub paths: Vec<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderImagesRequest {
    pub product_id: OwnerId,
    pub ordered_images: Vec<OrderChange>,
}

impl ApiClient {
    /// Ask the Signing Service for a short-lived upload URL.
    pub async fn signed_upload(&self, path: &str) -> Result<SignedUploadResponse> {
        let response: SignedUploadResponse = self
            .post_json(
                "/images/signed-upload",
                &SignedUploadRequest {
                    path: path.to_string(),
                },
            )
            .await
            .with_context(|| format!("Failed to sign upload for {}", path))?;

        if response.url.is_empty() {
            return Err(anyhow::anyhow!("Signing service returned an empty URL for {}", path));
        }

        Ok(response)
    }

    /// Create an image record and return its id.
    pub async fn add_image(&self, record: &NewImageRecord) -> Result<RecordId> {
        let response: AddImageResponse = self
            .post_json("/images/add", record)
            .await
            .context("Failed to create image record")?;
        Ok(response.id)
    }

    /// Delete an image record.
    pub async fn delete_image(&self, id: &RecordId) -> Result<()> {
        self.post_json_unit("/images/delete", &DeleteImageRequest { id: id.clone() })
            .await
            .with_context(|| format!("Failed to delete image record {}", id))
    }

    /// Remove storage objects.
    pub async fn delete_storage(&self, paths: &[String]) -> Result<()> {
        self.post_json_unit(
            "/images/delete-storage",
            &DeleteStorageRequest {
                paths: paths.to_vec(),
            },
        )
        .await
        .context("Failed to delete stored images")
    }

    /// List the image records of a product, ordered by `order`.
    pub async fn list_product_images(&self, owner_id: &OwnerId) -> Result<Vec<ImageRecord>> {
        let path = format!(
            "/products/{}/images",
            urlencoding::encode(owner_id.as_str())
        );
        let mut records: Vec<ImageRecord> = self
            .get(&path, &[])
            .await
            .with_context(|| format!("Failed to list images of {}", owner_id))?;
        records.sort_by_key(|record| record.order);
        Ok(records)
    }

    /// Write new order values for a product's images.
    pub async fn reorder_images(&self, owner_id: &OwnerId, changes: &[OrderChange]) -> Result<()> {
        self.post_json_unit(
            "/images/reorder",
            &ReorderImagesRequest {
                product_id: owner_id.clone(),
                ordered_images: changes.to_vec(),
            },
        )
        .await
        .context("Failed to reorder images")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Auth;
    use mockito::Matcher;
    use serde_json::json;

    async fn client(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(server.url(), Auth::Bearer("k".to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_signed_upload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/images/signed-upload")
            .match_body(Matcher::Json(json!({"path": "p1/original/1_a.png"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"url":"https://storage.example.com/put?token=t","path":"p1/original/1_a.png"}"#)
            .create_async()
            .await;

        let response = client(&server)
            .await
            .signed_upload("p1/original/1_a.png")
            .await
            .unwrap();

        assert_eq!(response.url, "https://storage.example.com/put?token=t");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_signed_upload_rejects_empty_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/images/signed-upload")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"url":"","path":"p"}"#)
            .create_async()
            .await;

        assert!(client(&server).await.signed_upload("p").await.is_err());
    }

    #[tokio::test]
    async fn test_add_image_sends_product_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/images/add")
            .match_body(Matcher::Json(json!({
                "productId": "prod_1",
                "basename": "1700000000000_photo",
                "extension": "png",
                "order": 10
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"img_1"}"#)
            .create_async()
            .await;

        let id = client(&server)
            .await
            .add_image(&NewImageRecord {
                owner_id: OwnerId::new("prod_1"),
                basename: "1700000000000_photo".to_string(),
                extension: "png".to_string(),
                order: 10,
            })
            .await
            .unwrap();

        assert_eq!(id, RecordId::new("img_1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_product_images_sorted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/products/prod_1/images")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id":"b","basename":"2_b","extension":"jpg","order":20},
                    {"id":"a","basename":"1_a","extension":"png","order":10}]"#,
            )
            .create_async()
            .await;

        let records = client(&server)
            .await
            .list_product_images(&OwnerId::new("prod_1"))
            .await
            .unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_reorder_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/images/reorder")
            .match_body(Matcher::Json(json!({
                "productId": "prod_1",
                "orderedImages": [{"id": "a", "order": 5}]
            })))
            .with_status(200)
            .create_async()
            .await;

        client(&server)
            .await
            .reorder_images(
                &OwnerId::new("prod_1"),
                &[OrderChange {
                    id: RecordId::new("a"),
                    order: 5,
                }],
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_storage_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/images/delete-storage")
            .match_body(Matcher::Json(json!({"paths": ["p/original/a.png"]})))
            .with_status(200)
            .create_async()
            .await;

        client(&server)
            .await
            .delete_storage(&["p/original/a.png".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
