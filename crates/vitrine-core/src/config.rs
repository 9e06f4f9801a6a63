//! Configuration module
//!
//! Settings for the image pipeline, read from `VITRINE_*` environment variables
//! (a `.env` file is honoured). Every value has a default except the API key.

use std::env;

use crate::constants::{
    DEFAULT_ENCODE_QUALITY, DEFAULT_GRANT_TTL_SECS, DEFAULT_MAX_CONCURRENT_UPLOADS,
    DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_TARGET_WIDTHS,
};
use crate::storage_types::StorageBackend;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Image pipeline configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Base URL of the storefront API (signing, records, storage deletion)
    pub api_url: String,
    pub api_key: Option<String>,
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    /// Resized variant widths, ascending and deduplicated
    pub target_widths: Vec<u32>,
    pub encode_quality: u8,
    pub max_concurrent_uploads: usize,
    pub max_file_size_bytes: usize,
    pub grant_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            storage_backend: StorageBackend::Http,
            local_storage_path: None,
            local_storage_base_url: None,
            target_widths: DEFAULT_TARGET_WIDTHS.to_vec(),
            encode_quality: DEFAULT_ENCODE_QUALITY,
            max_concurrent_uploads: DEFAULT_MAX_CONCURRENT_UPLOADS,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
            grant_ttl_secs: DEFAULT_GRANT_TTL_SECS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let storage_backend = match lookup("VITRINE_STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.storage_backend,
        };

        let target_widths = match lookup("VITRINE_TARGET_WIDTHS") {
            Some(value) => parse_widths(&value)?,
            None => defaults.target_widths,
        };

        let encode_quality = lookup("VITRINE_ENCODE_QUALITY")
            .map(|s| {
                s.trim()
                    .parse::<u8>()
                    .map_err(|_| anyhow::anyhow!("VITRINE_ENCODE_QUALITY must be a number in 1..=100"))
            })
            .transpose()?
            .unwrap_or(defaults.encode_quality);

        let max_concurrent_uploads = lookup("VITRINE_MAX_CONCURRENT_UPLOADS")
            .unwrap_or_else(|| DEFAULT_MAX_CONCURRENT_UPLOADS.to_string())
            .trim()
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_CONCURRENT_UPLOADS);

        let max_file_size_mb = lookup("VITRINE_MAX_FILE_SIZE_MB")
            .unwrap_or_else(|| DEFAULT_MAX_FILE_SIZE_MB.to_string())
            .trim()
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let grant_ttl_secs = lookup("VITRINE_GRANT_TTL_SECS")
            .unwrap_or_else(|| DEFAULT_GRANT_TTL_SECS.to_string())
            .trim()
            .parse::<u64>()
            .unwrap_or(DEFAULT_GRANT_TTL_SECS);

        Ok(Config {
            api_url: lookup("VITRINE_API_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            api_key: lookup("VITRINE_API_KEY").filter(|s| !s.is_empty()),
            storage_backend,
            local_storage_path: lookup("VITRINE_LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("VITRINE_LOCAL_STORAGE_BASE_URL"),
            target_widths,
            encode_quality,
            max_concurrent_uploads,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            grant_ttl_secs,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.target_widths.is_empty() {
            return Err(anyhow::anyhow!(
                "VITRINE_TARGET_WIDTHS must contain at least one width"
            ));
        }

        if self.target_widths.contains(&0) {
            return Err(anyhow::anyhow!("VITRINE_TARGET_WIDTHS must not contain 0"));
        }

        if self.max_concurrent_uploads == 0 {
            return Err(anyhow::anyhow!(
                "VITRINE_MAX_CONCURRENT_UPLOADS must be greater than 0"
            ));
        }

        if !(1..=100).contains(&self.encode_quality) {
            return Err(anyhow::anyhow!(
                "VITRINE_ENCODE_QUALITY must be between 1 and 100"
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("VITRINE_MAX_FILE_SIZE_MB must be greater than 0"));
        }

        match self.storage_backend {
            StorageBackend::Http => {
                if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
                    return Err(anyhow::anyhow!(
                        "VITRINE_API_URL must be an http(s) URL when using the http storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "VITRINE_LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Width of the smallest variant, used for gallery previews.
    pub fn preview_width(&self) -> Option<u32> {
        self.target_widths.first().copied()
    }
}

fn parse_widths(value: &str) -> Result<Vec<u32>, anyhow::Error> {
    let mut widths = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| anyhow::anyhow!("Invalid width in VITRINE_TARGET_WIDTHS: {}", s))
        })
        .collect::<Result<Vec<_>, _>>()?;
    widths.sort_unstable();
    widths.dedup();
    Ok(widths)
}
