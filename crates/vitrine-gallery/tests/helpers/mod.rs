//! Test helpers: a manager wired to in-memory collaborators.
//!
//! Run from workspace root: `cargo test -p vitrine-gallery`.

#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

use std::sync::Arc;

use fakes::{FakeGateway, FakeResizer, MemoryStore};
use vitrine_core::models::{EntryId, ImageEntry, OwnerId};
use vitrine_gallery::{ImageManager, ManagerSettings, UploadScheduler};

pub const OWNER: &str = "prod_1";

/// Manager plus handles on its collaborators.
pub struct TestGallery {
    pub manager: Arc<ImageManager>,
    pub gateway: Arc<FakeGateway>,
    pub store: Arc<MemoryStore>,
    pub resizer: Arc<FakeResizer>,
    pub scheduler: Arc<UploadScheduler>,
}

impl TestGallery {
    pub fn owner() -> OwnerId {
        OwnerId::new(OWNER)
    }

    pub async fn entry(&self, id: EntryId) -> ImageEntry {
        self.manager
            .entry(id)
            .await
            .unwrap_or_else(|| panic!("entry {id} missing"))
    }

    pub async fn orders(&self) -> Vec<i64> {
        self.manager
            .snapshot()
            .await
            .iter()
            .map(|entry| entry.order)
            .collect()
    }
}

pub struct TestGalleryBuilder {
    gateway: FakeGateway,
    resizer: FakeResizer,
    settings: ManagerSettings,
    max_workers: usize,
}

impl Default for TestGalleryBuilder {
    fn default() -> Self {
        Self {
            gateway: FakeGateway::new(),
            resizer: FakeResizer::new(),
            settings: ManagerSettings::default(),
            max_workers: 3,
        }
    }
}

impl TestGalleryBuilder {
    pub fn gateway(mut self, gateway: FakeGateway) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn resizer(mut self, resizer: FakeResizer) -> Self {
        self.resizer = resizer;
        self
    }

    pub fn widths(mut self, widths: &[u32]) -> Self {
        self.settings.target_widths = widths.to_vec();
        self
    }

    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn build(self) -> TestGallery {
        let gateway = Arc::new(self.gateway);
        let store = Arc::new(MemoryStore::new());
        let resizer = Arc::new(self.resizer);
        let scheduler = Arc::new(UploadScheduler::new(self.max_workers));

        let manager = ImageManager::new(
            TestGallery::owner(),
            gateway.clone(),
            store.clone(),
            scheduler.clone(),
            self.settings,
        )
        .with_resizer(resizer.clone());

        TestGallery {
            manager: Arc::new(manager),
            gateway,
            store,
            resizer,
            scheduler,
        }
    }
}

pub fn setup_gallery() -> TestGallery {
    TestGalleryBuilder::default().build()
}
