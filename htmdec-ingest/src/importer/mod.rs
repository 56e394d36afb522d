//! Recursive import walker
//!
//! The walker owns directory recursion and folder mirroring; the active
//! [`Strategy`] owns the interpretation of each leaf file.
//!
//! The walk is depth-first and single-threaded. Any error from the store,
//! the adapter or the filesystem aborts the whole import; nothing already
//! committed is rolled back.

mod pdv;
mod sem;

pub use pdv::PdvStrategy;
pub use sem::{header_name, SemStrategy};

use chrono::Utc;
use htmdec_common::events::{EventBus, HtmdecEvent, ResourceType};
use htmdec_common::models::{Item, Metadata, ParentRef, User};
use serde::Serialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::adapter::StorageAdapter;
use crate::error::ImportResult;
use crate::hierarchy::ensure_folder;
use crate::params::{DataType, ImportParams};
use crate::progress::ProgressReporter;
use crate::store::HierarchyStore;

/// Counters accumulated over one import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    /// Filesystem entries visited (one progress update each)
    pub entries_visited: u64,
    /// Directories mirrored as folders
    pub folders_mirrored: u64,
    /// Items created or reused
    pub items_imported: u64,
    /// Files handed to the adapter
    pub files_ingested: u64,
    /// Files refused by the adapter's predicate
    pub files_filtered: u64,
    /// SEM images skipped for lack of a header sidecar
    pub missing_headers: u64,
    /// Entries skipped (symlink loops, undecodable names)
    pub entries_skipped: u64,
}

/// Collaborators and state shared by the walker and the strategies
pub struct ImportContext<'a> {
    pub store: &'a dyn HierarchyStore,
    pub adapter: &'a dyn StorageAdapter,
    pub user: &'a User,
    pub progress: &'a dyn ProgressReporter,
    pub events: &'a EventBus,
    pub params: &'a ImportParams,
    stats: RefCell<ImportStats>,
}

impl<'a> ImportContext<'a> {
    pub fn new(
        store: &'a dyn HierarchyStore,
        adapter: &'a dyn StorageAdapter,
        user: &'a User,
        progress: &'a dyn ProgressReporter,
        events: &'a EventBus,
        params: &'a ImportParams,
    ) -> Self {
        Self {
            store,
            adapter,
            user,
            progress,
            events,
            params,
            stats: RefCell::new(ImportStats::default()),
        }
    }

    pub fn stats(&self) -> ImportStats {
        self.stats.borrow().clone()
    }

    fn record(&self, f: impl FnOnce(&mut ImportStats)) {
        f(&mut self.stats.borrow_mut());
    }

    /// Get or create the item `name` under `parent` and stamp `{tag: true}`
    fn tagged_item(&self, parent: &ParentRef, name: &str, tag: &str) -> ImportResult<Item> {
        let item = self.store.get_or_create_item(parent.id, name, self.user)?;
        let mut meta = Metadata::new();
        meta.insert(tag.to_string(), serde_json::Value::Bool(true));
        let item = self.store.set_metadata(item.id, meta)?;
        self.record(|s| s.items_imported += 1);
        Ok(item)
    }

    /// Emit the "resource imported" notification
    fn announce(&self, id: Uuid, resource_type: ResourceType, import_path: &Path) {
        self.events.emit_lossy(HtmdecEvent::ResourceImported {
            id,
            resource_type,
            import_path: import_path.to_string_lossy().into_owned(),
            timestamp: Utc::now(),
        });
    }

    /// Hand one file to the adapter if its predicate accepts it
    ///
    /// The MIME type is only computed for accepted files.
    fn offer_file(
        &self,
        item: &Item,
        path: &Path,
        name: &str,
        mime_type: impl FnOnce() -> std::io::Result<String>,
    ) -> ImportResult<bool> {
        if !self.adapter.should_import_file(path, self.params) {
            debug!(path = %path.display(), "File excluded by import filters");
            self.record(|s| s.files_filtered += 1);
            return Ok(false);
        }
        let mime_type = mime_type()?;
        self.adapter
            .import_file(item, path, self.user, name, &mime_type)?;
        self.record(|s| s.files_ingested += 1);
        Ok(true)
    }
}

/// Per-format interpretation of a single file
pub trait ImportItem {
    fn import_item(
        &self,
        ctx: &ImportContext<'_>,
        parent: &ParentRef,
        name: &str,
        import_path: &Path,
    ) -> ImportResult<()>;
}

/// Closed set of import strategies, chosen by declared data type
#[derive(Debug, Clone)]
pub enum Strategy {
    Sem(SemStrategy),
    Pdv(PdvStrategy),
}

impl Strategy {
    pub fn for_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Sem => Strategy::Sem(SemStrategy),
            DataType::Pdv => Strategy::Pdv(PdvStrategy),
        }
    }
}

impl ImportItem for Strategy {
    fn import_item(
        &self,
        ctx: &ImportContext<'_>,
        parent: &ParentRef,
        name: &str,
        import_path: &Path,
    ) -> ImportResult<()> {
        match self {
            Strategy::Sem(s) => s.import_item(ctx, parent, name, import_path),
            Strategy::Pdv(s) => s.import_item(ctx, parent, name, import_path),
        }
    }
}

/// Depth-first walker mirroring a directory tree into the store
pub struct Importer<'a> {
    ctx: ImportContext<'a>,
    strategy: Strategy,
    /// Canonical paths of the directories currently being walked
    ancestors: RefCell<Vec<PathBuf>>,
}

impl<'a> Importer<'a> {
    pub fn new(ctx: ImportContext<'a>, strategy: Strategy) -> Self {
        Self {
            ctx,
            strategy,
            ancestors: RefCell::new(Vec::new()),
        }
    }

    pub fn stats(&self) -> ImportStats {
        self.ctx.stats()
    }

    /// Import every entry of `import_path` under `parent`
    ///
    /// Entries are visited in filesystem order. A directory reached again
    /// through a link is walked every time, unless it is one of its own
    /// ancestors.
    pub fn import_data(&self, parent: &ParentRef, import_path: &Path) -> ImportResult<()> {
        let canonical = import_path.canonicalize()?;
        if self.ancestors.borrow().contains(&canonical) {
            warn!("Symlink loop detected: {}", import_path.display());
            self.ctx.record(|s| s.entries_skipped += 1);
            return Ok(());
        }

        self.ancestors.borrow_mut().push(canonical);
        let result = self.walk_entries(parent, import_path);
        self.ancestors.borrow_mut().pop();
        result
    }

    fn walk_entries(&self, parent: &ParentRef, import_path: &Path) -> ImportResult<()> {
        let entries = WalkDir::new(import_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);

        for entry in entries {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str() else {
                warn!("Skipping entry with non UTF-8 name: {}", entry.path().display());
                self.ctx.record(|s| s.entries_skipped += 1);
                continue;
            };

            self.ctx.progress.update(name);
            self.ctx.record(|s| s.entries_visited += 1);

            // follows symlinks, like the listing's consumers expect
            if entry.path().is_dir() {
                self.recurse_folder(parent, name, import_path)?;
            } else {
                self.strategy
                    .import_item(&self.ctx, parent, name, import_path)?;
            }
        }
        Ok(())
    }

    fn recurse_folder(&self, parent: &ParentRef, name: &str, import_path: &Path) -> ImportResult<()> {
        let folder = ensure_folder(self.ctx.store, parent, name, self.ctx.user)?;
        self.ctx.record(|s| s.folders_mirrored += 1);

        let next_path = import_path.join(name);
        self.ctx
            .announce(folder.id, ResourceType::Folder, &next_path);
        self.import_data(&folder.as_parent(), &next_path)
    }
}
