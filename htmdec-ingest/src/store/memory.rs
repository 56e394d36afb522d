//! In-memory hierarchical store
//!
//! All state lives behind one mutex, so each get-or-create looks up the
//! `(parent, name)` index and inserts under the same lock.

use chrono::Utc;
use htmdec_common::models::{
    Collection, Folder, Item, Metadata, NewFile, ParentRef, ParentType, StoredFile, User,
};
use htmdec_common::{Error, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use super::HierarchyStore;

#[derive(Default)]
struct StoreState {
    collections: HashMap<Uuid, Collection>,
    folders: HashMap<Uuid, Folder>,
    folder_index: HashMap<(Uuid, String), Uuid>,
    items: HashMap<Uuid, Item>,
    item_index: HashMap<(Uuid, String), Uuid>,
    files: HashMap<Uuid, StoredFile>,
    /// Per item, file ids in attachment order
    item_files: HashMap<Uuid, Vec<Uuid>>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| Error::Internal("store lock poisoned".to_string()))
    }

    /// Create a top-level collection
    pub fn create_collection(&self, name: &str, creator: &User) -> Result<Collection> {
        let collection = Collection {
            id: Uuid::new_v4(),
            name: name.to_string(),
            creator_id: creator.id,
            created: Utc::now(),
        };
        self.lock()?
            .collections
            .insert(collection.id, collection.clone());
        Ok(collection)
    }

    /// Child folders of a parent, sorted by name
    pub fn child_folders(&self, parent: &ParentRef) -> Result<Vec<Folder>> {
        let state = self.lock()?;
        let mut folders: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| f.parent == *parent)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }

    /// Items of a folder, sorted by name
    pub fn child_items(&self, folder_id: Uuid) -> Result<Vec<Item>> {
        let state = self.lock()?;
        let mut items: Vec<Item> = state
            .items
            .values()
            .filter(|i| i.folder_id == folder_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    pub fn folder_count(&self) -> usize {
        self.lock().map(|s| s.folders.len()).unwrap_or(0)
    }

    pub fn item_count(&self) -> usize {
        self.lock().map(|s| s.items.len()).unwrap_or(0)
    }

    pub fn file_count(&self) -> usize {
        self.lock().map(|s| s.files.len()).unwrap_or(0)
    }
}

fn ensure_parent_exists(state: &StoreState, parent: &ParentRef) -> Result<()> {
    let exists = match parent.parent_type {
        ParentType::Folder => state.folders.contains_key(&parent.id),
        ParentType::Collection => state.collections.contains_key(&parent.id),
        // users are managed outside this store
        ParentType::User => true,
    };
    if exists {
        Ok(())
    } else {
        Err(Error::NotFound(format!("{} {}", parent.parent_type, parent.id)))
    }
}

impl HierarchyStore for MemoryStore {
    fn get_or_create_folder(&self, parent: &ParentRef, name: &str, creator: &User) -> Result<Folder> {
        if name.is_empty() {
            return Err(Error::InvalidInput("Folder name must not be empty".to_string()));
        }
        let mut state = self.lock()?;
        ensure_parent_exists(&state, parent)?;

        let key = (parent.id, name.to_string());
        if let Some(id) = state.folder_index.get(&key) {
            return state
                .folders
                .get(id)
                .cloned()
                .ok_or_else(|| Error::Internal(format!("dangling folder index {}", id)));
        }

        let folder = Folder {
            id: Uuid::new_v4(),
            name: name.to_string(),
            parent: *parent,
            creator_id: creator.id,
            created: Utc::now(),
        };
        debug!(folder_id = %folder.id, name, parent = %parent.id, "Created folder");
        state.folder_index.insert(key, folder.id);
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    fn get_or_create_item(&self, folder_id: Uuid, name: &str, creator: &User) -> Result<Item> {
        if name.is_empty() {
            return Err(Error::InvalidInput("Item name must not be empty".to_string()));
        }
        let mut state = self.lock()?;
        if !state.folders.contains_key(&folder_id) {
            return Err(Error::NotFound(format!("folder {}", folder_id)));
        }

        let key = (folder_id, name.to_string());
        if let Some(id) = state.item_index.get(&key) {
            return state
                .items
                .get(id)
                .cloned()
                .ok_or_else(|| Error::Internal(format!("dangling item index {}", id)));
        }

        let item = Item {
            id: Uuid::new_v4(),
            name: name.to_string(),
            folder_id,
            creator_id: creator.id,
            created: Utc::now(),
            meta: Metadata::new(),
        };
        debug!(item_id = %item.id, name, folder_id = %folder_id, "Created item");
        state.item_index.insert(key, item.id);
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    fn set_metadata(&self, item_id: Uuid, metadata: Metadata) -> Result<Item> {
        let mut state = self.lock()?;
        let item = state
            .items
            .get_mut(&item_id)
            .ok_or_else(|| Error::NotFound(format!("item {}", item_id)))?;
        for (key, value) in metadata {
            if value.is_null() {
                item.meta.remove(&key);
            } else {
                item.meta.insert(key, value);
            }
        }
        Ok(item.clone())
    }

    fn upsert_file(&self, item_id: Uuid, file: NewFile, creator: &User) -> Result<StoredFile> {
        let mut state = self.lock()?;
        if !state.items.contains_key(&item_id) {
            return Err(Error::NotFound(format!("item {}", item_id)));
        }

        let existing = state
            .item_files
            .get(&item_id)
            .into_iter()
            .flatten()
            .find(|id| state.files.get(*id).is_some_and(|f| f.name == file.name))
            .copied();

        let stored = StoredFile {
            id: existing.unwrap_or_else(Uuid::new_v4),
            item_id,
            name: file.name,
            mime_type: file.mime_type,
            size: file.size,
            path: file.path,
            sha256: file.sha256,
            creator_id: creator.id,
            created: Utc::now(),
        };
        if existing.is_none() {
            state.item_files.entry(item_id).or_default().push(stored.id);
        }
        state.files.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn load_folder(&self, id: Uuid) -> Result<Folder> {
        self.lock()?
            .folders
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("folder {}", id)))
    }

    fn load_item(&self, id: Uuid) -> Result<Item> {
        self.lock()?
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("item {}", id)))
    }

    fn load_file(&self, id: Uuid) -> Result<StoredFile> {
        self.lock()?
            .files
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("file {}", id)))
    }

    fn child_files(&self, item_id: Uuid) -> Result<Vec<StoredFile>> {
        let state = self.lock()?;
        Ok(state
            .item_files
            .get(&item_id)
            .into_iter()
            .flatten()
            .filter_map(|id| state.files.get(id).cloned())
            .collect())
    }

    fn read_file(&self, file_id: Uuid) -> Result<Vec<u8>> {
        let file = self.load_file(file_id)?;
        let path = file
            .path
            .ok_or_else(|| Error::NotFound(format!("no local content for file {}", file_id)))?;
        Ok(std::fs::read(path)?)
    }
}
