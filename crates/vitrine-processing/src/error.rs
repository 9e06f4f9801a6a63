use thiserror::Error;

/// Errors produced while decoding, resizing or encoding an image
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Resize task failed: {0}")]
    TaskFailed(String),
}

/// Result type for processing operations
pub type ProcessingResult<T> = Result<T, ProcessingError>;
