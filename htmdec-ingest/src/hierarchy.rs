//! Folder hierarchy builder
//!
//! Thin layer over the store's idempotent folder creation, shared by the
//! walker, the date-bucketing strategy and the recursive-folders route.

use htmdec_common::models::{Folder, ParentRef, User};
use htmdec_common::{Error, Result};

use crate::store::HierarchyStore;

/// Get or create the folder `name` under `parent`
pub fn ensure_folder(
    store: &dyn HierarchyStore,
    parent: &ParentRef,
    name: &str,
    creator: &User,
) -> Result<Folder> {
    store.get_or_create_folder(parent, name, creator)
}

/// Get or create every segment of a `/`-separated path below `parent`
///
/// The first segment hangs under `parent` with its own type tag; deeper
/// segments hang under folders. Returns the deepest folder.
pub fn create_folders(
    store: &dyn HierarchyStore,
    parent: ParentRef,
    path: &str,
    creator: &User,
) -> Result<Folder> {
    let mut parent = parent;
    let mut deepest = None;
    for name in path.split('/').filter(|s| !s.is_empty()) {
        let folder = ensure_folder(store, &parent, name, creator)?;
        parent = folder.as_parent();
        deepest = Some(folder);
    }
    deepest.ok_or_else(|| Error::InvalidInput(format!("No folder names in path {:?}", path)))
}
