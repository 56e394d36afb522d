//! Resource models of the hierarchical content store
//!
//! Folders, items and files are owned by the store; the import engine only
//! constructs and addresses them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

/// Flat key/value metadata attached to an item
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Kind of node a folder hangs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentType {
    Collection,
    Folder,
    User,
}

impl ParentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentType::Collection => "collection",
            ParentType::Folder => "folder",
            ParentType::User => "user",
        }
    }
}

impl fmt::Display for ParentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParentType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "collection" => Ok(ParentType::Collection),
            "folder" => Ok(ParentType::Folder),
            "user" => Ok(ParentType::User),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown parent type: {}",
                other
            ))),
        }
    }
}

/// Reference to a parent node: its id plus type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: Uuid,
    pub parent_type: ParentType,
}

impl ParentRef {
    pub fn folder(id: Uuid) -> Self {
        Self {
            id,
            parent_type: ParentType::Folder,
        }
    }
}

/// Acting user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub login: String,
}

impl User {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            login: login.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    pub creator_id: Uuid,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub parent: ParentRef,
    pub creator_id: Uuid,
    pub created: DateTime<Utc>,
}

impl Folder {
    /// This folder as the parent of a child node
    pub fn as_parent(&self) -> ParentRef {
        ParentRef::folder(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub folder_id: Uuid,
    pub creator_id: Uuid,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub meta: Metadata,
}

/// File record attached to an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: Uuid,
    pub item_id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    /// Local path of the bytes, when the backing store keeps them on disk
    pub path: Option<PathBuf>,
    /// Hex SHA-256 of the content
    pub sha256: Option<String>,
    pub creator_id: Uuid,
    pub created: DateTime<Utc>,
}

/// Fields of a file record before the store assigns an identity
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub path: Option<PathBuf>,
    pub sha256: Option<String>,
}
