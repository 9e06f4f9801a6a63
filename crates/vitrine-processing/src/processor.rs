//! Variant generation - decode once, resize and re-encode per target width

use crate::encoder::{ImageEncoder, OutputFormat};
use crate::error::{ProcessingError, ProcessingResult};
use crate::resize::ImageResize;
use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;
use std::time::Instant;
use vitrine_core::constants::DEFAULT_ENCODE_QUALITY;
use vitrine_core::models::SourceFile;
use vitrine_core::Config;

/// One re-encoded variant of a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedImage {
    pub width: u32,
    pub height: u32,
    pub data: Bytes,
    pub content_type: &'static str,
}

/// Produces one variant per target width, in the order the widths are given.
#[async_trait]
pub trait VariantResizer: Send + Sync {
    async fn resize(&self, source: &SourceFile, widths: &[u32]) -> ProcessingResult<Vec<ResizedImage>>;
}

/// Resizer backed by the `image` and `webp` crates.
#[derive(Debug, Clone, Copy)]
pub struct ImageResizer {
    quality: u8,
}

impl Default for ImageResizer {
    fn default() -> Self {
        Self::new(DEFAULT_ENCODE_QUALITY)
    }
}

impl ImageResizer {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.encode_quality)
    }

    /// Decode and check that the bytes are an accepted format.
    ///
    /// The declared extension picks the output format; the detected format only has
    /// to be one of the accepted ones.
    pub fn decode(data: &[u8]) -> ProcessingResult<DynamicImage> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;

        match reader.format() {
            Some(format) if OutputFormat::from_image_format(format).is_some() => {}
            Some(format) => {
                return Err(ProcessingError::UnsupportedFormat(format!("{:?}", format)));
            }
            None => {
                return Err(ProcessingError::UnsupportedFormat(
                    "unrecognized image data".to_string(),
                ));
            }
        }

        Ok(reader.decode()?)
    }

    /// Synchronous variant generation.
    pub fn resize_bytes(
        &self,
        data: &[u8],
        extension: &str,
        widths: &[u32],
    ) -> ProcessingResult<Vec<ResizedImage>> {
        let format = OutputFormat::from_extension(extension)
            .ok_or_else(|| ProcessingError::UnsupportedFormat(extension.to_string()))?;
        let img = Self::decode(data)?;

        widths
            .iter()
            .map(|&width| {
                let resized = ImageResize::resize_to_width(&img, width);
                let (width, height) = resized.dimensions();
                let data = ImageEncoder::encode(&resized, format, self.quality)?;
                Ok(ResizedImage {
                    width,
                    height,
                    data,
                    content_type: format.to_mime_type(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl VariantResizer for ImageResizer {
    async fn resize(&self, source: &SourceFile, widths: &[u32]) -> ProcessingResult<Vec<ResizedImage>> {
        let extension = source
            .extension()
            .ok_or_else(|| ProcessingError::UnsupportedFormat(source.file_name.clone()))?;
        let data = source.data.clone();
        let widths = widths.to_vec();
        let resizer = *self;
        let start = Instant::now();

        let variants = tokio::task::spawn_blocking(move || {
            resizer.resize_bytes(&data, &extension, &widths)
        })
        .await
        .map_err(|e| ProcessingError::TaskFailed(e.to_string()))??;

        tracing::debug!(
            file_name = %source.file_name,
            variants = variants.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Generated resized variants"
        );

        Ok(variants)
    }
}
