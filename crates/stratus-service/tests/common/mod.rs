//! Shared fixtures for the tree engine integration tests.
//!
//! Every test runs against the in-memory node store and a local storage
//! provider rooted in a fresh temporary directory, so both sides of the
//! tree (metadata and filesystem) can be asserted on directly.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use stratus_core::config::storage::StorageConfig;
use stratus_database::repositories::MemoryNodeStore;
use stratus_entity::node::Node;
use stratus_service::tree::UploadParams;
use stratus_service::{DownloadService, PreviewService, RequestContext, TreeService};
use stratus_storage::LocalStorageProvider;

/// A fully wired engine over throwaway backends.
pub struct TestDrive {
    pub tree: TreeService,
    pub preview: PreviewService,
    pub download: DownloadService,
    /// Direct handle on the metadata store, for corrupting state in tests.
    pub store: Arc<MemoryNodeStore>,
    /// Absolute storage root on disk.
    pub root: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestDrive {
    /// Absolute filesystem location backing a node.
    pub fn physical(&self, node: &Node) -> PathBuf {
        self.root.join(&node.storage_path)
    }
}

/// Build a test drive with the default configuration.
pub async fn test_drive() -> TestDrive {
    test_drive_with(|_| {}).await
}

/// Build a test drive, letting the caller tweak the storage config.
pub async fn test_drive_with(tweak: impl FnOnce(&mut StorageConfig)) -> TestDrive {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();

    let mut config = StorageConfig::default();
    config.root_path = root.to_str().expect("utf-8 tempdir").to_string();
    tweak(&mut config);

    let store = Arc::new(MemoryNodeStore::new());
    let storage = Arc::new(
        LocalStorageProvider::new(&config.root_path)
            .await
            .expect("storage root"),
    );

    TestDrive {
        tree: TreeService::new(store.clone(), storage.clone(), config.clone()),
        preview: PreviewService::new(store.clone(), storage.clone(), config),
        download: DownloadService::new(store.clone(), storage),
        store,
        root,
        _dir: dir,
    }
}

/// A request context for a fresh owner.
pub fn ctx() -> RequestContext {
    RequestContext::new(Uuid::new_v4())
}

/// Upload parameters for a plain byte body.
pub fn upload(parent_id: Option<Uuid>, file_name: &str, body: &str) -> UploadParams {
    UploadParams {
        parent_id,
        file_name: file_name.to_string(),
        mime_type: None,
        data: Bytes::from(body.to_string()),
    }
}
