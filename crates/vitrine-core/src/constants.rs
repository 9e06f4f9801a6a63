//! Shared constants for the image pipeline.

/// Distance between consecutive order values on initial population and append.
pub const ORDER_GAP: i64 = 10;

/// Target widths of the resized variants, ascending. The first entry doubles as
/// the gallery preview.
pub const DEFAULT_TARGET_WIDTHS: [u32; 7] = [720, 900, 1080, 1296, 1512, 1728, 2048];

/// Encode quality for lossy formats (JPEG, WebP).
pub const DEFAULT_ENCODE_QUALITY: u8 = 85;

/// Number of images moving through the upload saga at once.
pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 3;

/// Largest accepted source file, matching the storage bucket's object limit.
pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 5;

/// Lifetime requested for signed upload URLs.
pub const DEFAULT_GRANT_TTL_SECS: u64 = 300;

/// Storage folder holding the untouched uploads.
pub const ORIGINAL_FOLDER: &str = "original";

/// Storage folder holding the resized variants.
pub const RESIZED_FOLDER: &str = "resized";
