//! HTTP client for the storefront API.
//!
//! Provides a minimal client with configurable auth (Bearer token or X-API-Key),
//! generic GET/POST/PUT helpers, and the routes the image pipeline depends on:
//! signed uploads, image records and storage deletion. [`ApiClient`] implements
//! [`vitrine_core::RecordGateway`] and [`HttpStore`] wraps it as a
//! [`vitrine_storage::RemoteStore`].

pub mod api;
pub mod gateway;
pub mod store;

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use vitrine_core::Config;

pub use api::{
    AddImageResponse, DeleteImageRequest, DeleteStorageRequest, ReorderImagesRequest,
    SignedUploadRequest, SignedUploadResponse,
};
pub use store::{create_store, HttpStore};

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// No credentials (local development servers)
    None,
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// Non-success HTTP status returned by the API or a signed URL.
#[derive(Debug, thiserror::Error)]
#[error("API request failed with status {status}: {message}")]
pub struct StatusError {
    pub status: u16,
    pub message: String,
}

/// HTTP client for the storefront API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Create client from configuration. A configured API key is sent as a Bearer token.
    pub fn from_config(config: &Config) -> Result<Self> {
        let auth = match &config.api_key {
            Some(key) => Auth::Bearer(key.clone()),
            None => Auth::None,
        };
        Self::new(config.api_url.clone(), auth)
    }

    /// Create client from environment (`VITRINE_API_URL`, `VITRINE_API_KEY`).
    pub fn from_env() -> Result<Self> {
        let config = Config::from_env()?;
        Self::from_config(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::None => request,
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(StatusError {
            status: status.as_u16(),
            message,
        }
        .into())
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.build_url(path);
        let mut request = self.apply_auth(self.client.get(&url));

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.context("Failed to send request")?;
        let response = Self::ensure_success(response).await?;

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send_post(path, body).await?;

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// POST JSON body, ignoring the response body.
    pub async fn post_json_unit<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<()> {
        self.send_post(path, body).await?;
        Ok(())
    }

    async fn send_post<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.post(&url).json(body));

        let response = request.send().await.context("Failed to send request")?;
        Self::ensure_success(response).await
    }

    /// PUT raw bytes to an absolute (signed) URL. The URL carries its own authorization.
    pub async fn put_bytes(&self, url: &str, data: Bytes, content_type: &str) -> Result<()> {
        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .context("Failed to send upload")?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Raw client for custom requests. Caller must apply auth via build_url and headers.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Status code of a failed request, if the server answered at all.
pub fn status_of(err: &anyhow::Error) -> Option<u16> {
    err.downcast_ref::<StatusError>().map(|e| e.status)
}
