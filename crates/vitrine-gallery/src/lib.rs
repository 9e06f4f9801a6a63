//! Vitrine Gallery
//!
//! The image manager state machine with its upload saga, the bounded upload
//! scheduler it runs uploads through, and the read-only gallery view.
//!
//! ```text
//! GalleryView ──intents──▶ ImageManager ──▶ RecordGateway (records)
//!      ▲                        │       ──▶ RemoteStore   (objects)
//!      └──── snapshots ─────────┘       ──▶ VariantResizer
//! ```

pub mod basename;
pub mod manager;
pub mod scheduler;
pub mod settings;
pub mod view;

pub use basename::BasenameAllocator;
pub use manager::{AddFilesOutcome, ImageManager, RejectedFile, UploadSummary, INTERRUPTED_DETAIL};
pub use scheduler::UploadScheduler;
pub use settings::ManagerSettings;
pub use view::{GalleryIntent, GalleryTile, GalleryView, IntentOutcome};
