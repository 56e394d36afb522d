//! Storage adapters
//!
//! An adapter decides which files an import is allowed to ingest and
//! attaches accepted files to items.

use htmdec_common::models::{Item, NewFile, StoredFile, User};
use htmdec_common::Result;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::params::ImportParams;
use crate::store::HierarchyStore;

pub trait StorageAdapter: Send + Sync {
    /// Whether the import may ingest the file at `path`
    fn should_import_file(&self, path: &Path, params: &ImportParams) -> bool;

    /// Ingest the file at `path` into `item` under `name`
    fn import_file(
        &self,
        item: &Item,
        path: &Path,
        user: &User,
        name: &str,
        mime_type: &str,
    ) -> Result<StoredFile>;
}

/// Adapter that references files where they already live on disk
///
/// No bytes are copied; the file record carries the local path, the size
/// and a SHA-256 of the content.
pub struct FilesystemAdapter {
    store: Arc<dyn HierarchyStore>,
}

impl FilesystemAdapter {
    pub fn new(store: Arc<dyn HierarchyStore>) -> Self {
        Self { store }
    }
}

impl StorageAdapter for FilesystemAdapter {
    fn should_import_file(&self, path: &Path, params: &ImportParams) -> bool {
        path.file_name()
            .map(|name| params.accepts_name(&name.to_string_lossy()))
            .unwrap_or(false)
    }

    fn import_file(
        &self,
        item: &Item,
        path: &Path,
        user: &User,
        name: &str,
        mime_type: &str,
    ) -> Result<StoredFile> {
        let size = std::fs::metadata(path)?.len();
        let sha256 = sha256_file(path)?;

        let stored = self.store.upsert_file(
            item.id,
            NewFile {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                size,
                path: Some(path.to_path_buf()),
                sha256: Some(sha256),
            },
            user,
        )?;
        debug!(
            file_id = %stored.id,
            item_id = %item.id,
            path = %path.display(),
            mime_type,
            size,
            "Imported file"
        );
        Ok(stored)
    }
}

fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
