//! Hierarchical store interface
//!
//! The store owns folders, items and files. The import engine relies on one
//! contract above all others: get-or-create is idempotent and atomic under
//! `(parent, name)` for folders and `(folder, name)` for items.

mod memory;

pub use memory::MemoryStore;

use htmdec_common::models::{Folder, Item, Metadata, NewFile, ParentRef, StoredFile, User};
use htmdec_common::Result;
use uuid::Uuid;

pub trait HierarchyStore: Send + Sync {
    /// Return the folder named `name` under `parent`, creating it if absent
    fn get_or_create_folder(&self, parent: &ParentRef, name: &str, creator: &User) -> Result<Folder>;

    /// Return the item named `name` in `folder_id`, creating it if absent
    fn get_or_create_item(&self, folder_id: Uuid, name: &str, creator: &User) -> Result<Item>;

    /// Merge `metadata` into the item's metadata; `null` values delete keys
    fn set_metadata(&self, item_id: Uuid, metadata: Metadata) -> Result<Item>;

    /// Attach a file record to an item, replacing any file of the same name
    fn upsert_file(&self, item_id: Uuid, file: NewFile, creator: &User) -> Result<StoredFile>;

    fn load_folder(&self, id: Uuid) -> Result<Folder>;

    fn load_item(&self, id: Uuid) -> Result<Item>;

    fn load_file(&self, id: Uuid) -> Result<StoredFile>;

    /// Files of an item in attachment order
    fn child_files(&self, item_id: Uuid) -> Result<Vec<StoredFile>>;

    /// Read a stored file's content
    fn read_file(&self, file_id: Uuid) -> Result<Vec<u8>>;
}
