//! Test helper utilities
//!
//! Shared fixtures for htmdec-ingest integration tests: on-disk trees and
//! an in-memory store with one destination folder.

#![allow(dead_code)]

pub mod log_capture;

pub use log_capture::{with_log_capture, LogCapture};

use htmdec_common::events::{EventBus, HtmdecEvent};
use htmdec_common::models::{Folder, Item, ParentRef, ParentType, User};
use htmdec_ingest::adapter::FilesystemAdapter;
use htmdec_ingest::params::RawImportParams;
use htmdec_ingest::store::{HierarchyStore, MemoryStore};
use htmdec_ingest::{run_import, ImportEnv, ImportRequest, ImportResult, ImportSummary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Directory tree on disk, removed on drop
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `rel`, creating parent directories
    pub fn file(&self, rel: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        std::fs::create_dir_all(&path).unwrap();
        path
    }
}

/// Store, adapter and event bus around one destination folder
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub adapter: FilesystemAdapter,
    pub user: User,
    pub events: EventBus,
    pub destination: Folder,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let user = User::new("tester");
        let collection = store.create_collection("lab", &user).unwrap();
        let destination = store
            .get_or_create_folder(
                &ParentRef {
                    id: collection.id,
                    parent_type: ParentType::Collection,
                },
                "incoming",
                &user,
            )
            .unwrap();
        Self {
            adapter: FilesystemAdapter::new(store.clone()),
            store,
            user,
            events: EventBus::new(1024),
            destination,
        }
    }

    pub fn request(&self, data_type: &str, path: &Path) -> ImportRequest {
        ImportRequest {
            data_type: data_type.to_string(),
            destination_id: self.destination.id,
            destination_type: "folder".to_string(),
            import_path: path.to_path_buf(),
            progress: true,
            params: RawImportParams::default(),
        }
    }

    pub fn run(&self, request: ImportRequest) -> ImportResult<ImportSummary> {
        let env = ImportEnv {
            store: self.store.as_ref(),
            adapter: &self.adapter,
            user: &self.user,
            events: &self.events,
            default_exclude: None,
        };
        run_import(&env, request)
    }

    pub fn import(&self, data_type: &str, path: &Path) -> ImportSummary {
        self.run(self.request(data_type, path)).unwrap()
    }

    /// Folder named `name` under `parent`, if any
    pub fn folder(&self, parent: &Folder, name: &str) -> Option<Folder> {
        self.store
            .child_folders(&parent.as_parent())
            .unwrap()
            .into_iter()
            .find(|f| f.name == name)
    }

    /// Follow a `/`-separated folder path below the destination
    pub fn folder_at(&self, path: &str) -> Option<Folder> {
        let mut folder = self.destination.clone();
        for name in path.split('/') {
            folder = self.folder(&folder, name)?;
        }
        Some(folder)
    }

    pub fn items(&self, folder: &Folder) -> Vec<Item> {
        self.store.child_items(folder.id).unwrap()
    }

    pub fn file_names(&self, item: &Item) -> Vec<(String, String)> {
        self.store
            .child_files(item.id)
            .unwrap()
            .into_iter()
            .map(|f| (f.name, f.mime_type))
            .collect()
    }
}

/// Every event currently queued on `rx`
pub fn drain(rx: &mut broadcast::Receiver<HtmdecEvent>) -> Vec<HtmdecEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

/// Ids announced by `ResourceImported` events
pub fn announced_ids(events: &[HtmdecEvent]) -> Vec<Uuid> {
    events
        .iter()
        .filter_map(|e| match e {
            HtmdecEvent::ResourceImported { id, .. } => Some(*id),
            _ => None,
        })
        .collect()
}
