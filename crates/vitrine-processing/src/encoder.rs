use crate::error::{ProcessingError, ProcessingResult};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Formats variants are written in. A variant always keeps its original's format so
/// that its path extension stays truthful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(OutputFormat::Jpeg),
            ImageFormat::Png => Some(OutputFormat::Png),
            ImageFormat::WebP => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }
}

/// Encodes decoded images
pub struct ImageEncoder;

impl ImageEncoder {
    /// Encode `img`. `quality` (1..=100) applies to the lossy formats; PNG is lossless.
    pub fn encode(img: &DynamicImage, format: OutputFormat, quality: u8) -> ProcessingResult<Bytes> {
        match format {
            OutputFormat::Jpeg => Self::encode_jpeg(img, quality),
            OutputFormat::Png => Self::encode_png(img),
            OutputFormat::WebP => Self::encode_webp(img, quality),
        }
    }

    fn encode_jpeg(img: &DynamicImage, quality: u8) -> ProcessingResult<Bytes> {
        let rgb_img = img.to_rgb8();
        let mut buffer = Vec::new();

        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        encoder
            .encode_image(&rgb_img)
            .map_err(|e| ProcessingError::Encode(format!("jpeg: {}", e)))?;

        Ok(Bytes::from(buffer))
    }

    fn encode_png(img: &DynamicImage) -> ProcessingResult<Bytes> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ProcessingError::Encode(format!("png: {}", e)))?;

        Ok(Bytes::from(buffer))
    }

    fn encode_webp(img: &DynamicImage, quality: u8) -> ProcessingResult<Bytes> {
        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder.encode(quality.clamp(1, 100) as f32);

        Ok(Bytes::copy_from_slice(&webp_data))
    }
}
