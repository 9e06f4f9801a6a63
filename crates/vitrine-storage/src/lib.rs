//! Vitrine Storage Library
//!
//! This crate provides the remote store abstraction used by the image pipeline and a
//! local filesystem implementation. The HTTP implementation backed by signed upload
//! URLs lives in `vitrine-api-client`.
//!
//! # Storage path format
//!
//! Every image owns one original and one resized object per target width:
//!
//! - **Original**: `{owner_id}/original/{basename}.{extension}`
//! - **Variant**: `{owner_id}/resized/{basename}_{width}x.{extension}`
//!
//! Paths must not contain `..` or a leading `/`. Path derivation is centralized in the
//! `keys` module so uploads, deletions and previews always agree.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_store;
pub use keys::{derive_paths, preview_path, ImagePaths};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{RemoteStore, StorageError, StorageResult, WriteGrant};
pub use vitrine_core::StorageBackend;
