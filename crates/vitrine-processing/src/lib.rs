//! Vitrine Processing Library
//!
//! This crate decides which selected files the gallery accepts and produces the
//! resized variants uploaded next to every original. Everything here is local and
//! CPU-bound; async callers go through [`VariantResizer`], which moves the work off the
//! executor.

pub mod encoder;
pub mod error;
pub mod processor;
pub mod resize;
pub mod validator;

pub use encoder::{ImageEncoder, OutputFormat};
pub use error::{ProcessingError, ProcessingResult};
pub use processor::{ImageResizer, ResizedImage, VariantResizer};
pub use resize::ImageResize;
pub use validator::{content_type_for_extension, ImageValidator, ValidationError};
