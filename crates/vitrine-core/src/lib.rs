//! Vitrine Core Library
//!
//! This crate provides the domain models, the sparse order allocator, error types,
//! configuration and collaborator traits shared by all Vitrine components.

pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod models;
pub mod order;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ErrorMetadata, LogLevel, PipelineError, PipelineResult, PipelineStep};
pub use gateway::{RecordError, RecordGateway, RecordResult};
pub use order::Sequenced;
pub use storage_types::StorageBackend;
