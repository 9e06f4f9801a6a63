//! Shared path derivation for stored images.
//!
//! Path format: `{owner}/original/{basename}.{ext}` for the upload and
//! `{owner}/resized/{basename}_{width}x.{ext}` for each variant.

use vitrine_core::constants::{ORIGINAL_FOLDER, RESIZED_FOLDER};
use vitrine_core::models::OwnerId;

/// Every storage path of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePaths {
    pub original: String,
    /// One path per target width, in width order.
    pub resized: Vec<String>,
}

impl ImagePaths {
    /// Path of the smallest variant, used for gallery previews.
    pub fn preview(&self) -> Option<&str> {
        self.resized.first().map(String::as_str)
    }

    /// Original followed by all variants.
    pub fn all(&self) -> Vec<String> {
        std::iter::once(self.original.clone())
            .chain(self.resized.iter().cloned())
            .collect()
    }
}

/// Derive the storage paths of an image.
///
/// Deterministic: the same inputs always produce the same paths, so deletion can
/// recompute them from the record alone.
pub fn derive_paths(owner_id: &OwnerId, basename: &str, extension: &str, widths: &[u32]) -> ImagePaths {
    ImagePaths {
        original: original_path(owner_id, basename, extension),
        resized: widths
            .iter()
            .map(|width| resized_path(owner_id, basename, extension, *width))
            .collect(),
    }
}

/// Path of the smallest variant, if any widths are configured.
pub fn preview_path(
    owner_id: &OwnerId,
    basename: &str,
    extension: &str,
    widths: &[u32],
) -> Option<String> {
    widths
        .first()
        .map(|width| resized_path(owner_id, basename, extension, *width))
}

fn original_path(owner_id: &OwnerId, basename: &str, extension: &str) -> String {
    format!("{}/{}/{}.{}", owner_id, ORIGINAL_FOLDER, basename, extension)
}

fn resized_path(owner_id: &OwnerId, basename: &str, extension: &str, width: u32) -> String {
    format!(
        "{}/{}/{}_{}x.{}",
        owner_id, RESIZED_FOLDER, basename, width, extension
    )
}

/// Reject paths that could escape the owner's folders.
pub fn validate_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && !path.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..")
}
