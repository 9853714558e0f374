//! Entry types for filevault.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use utoipa::ToSchema;

/// Kind of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Container for other entries; never has content.
    Folder,
    /// Opaque file content.
    File,
    /// Image content; derived thumbnails are produced for it.
    Image,
}

impl EntryType {
    /// Database/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Folder => "folder",
            EntryType::File => "file",
            EntryType::Image => "image",
        }
    }

    /// Whether entries of this type carry content in the blob store.
    pub fn has_content(&self) -> bool {
        !matches!(self, EntryType::Folder)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = String;

    /// Exact, case-sensitive match against the accepted set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folder" => Ok(EntryType::Folder),
            "file" => Ok(EntryType::File),
            "image" => Ok(EntryType::Image),
            _ => Err(format!("unknown entry type: {s}")),
        }
    }
}

impl TryFrom<String> for EntryType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A stored entry (file or folder).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Entry {
    /// Unique entry ID.
    pub id: i64,
    /// Owning user ID.
    pub owner_id: i64,
    /// Display name.
    pub name: String,
    /// Entry kind.
    #[sqlx(try_from = "String")]
    pub entry_type: EntryType,
    /// Whether anyone may read the content.
    pub is_public: bool,
    /// Containing folder (None for top-level entries).
    pub parent_id: Option<i64>,
    /// Blob store key; None for folders.
    pub content_id: Option<String>,
    /// When the entry was created.
    pub created_at: String,
}

impl Entry {
    /// Caller-facing projection of this entry.
    pub fn view(&self) -> EntryView {
        EntryView::from(self)
    }
}

/// Caller-facing projection of an entry. Never exposes the content ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    /// Entry ID.
    pub id: i64,
    /// Owning user ID.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Public visibility.
    pub is_public: bool,
    /// Containing folder; omitted for top-level entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

impl From<&Entry> for EntryView {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.owner_id,
            name: entry.name.clone(),
            entry_type: entry.entry_type,
            is_public: entry.is_public,
            parent_id: entry.parent_id,
        }
    }
}

impl From<Entry> for EntryView {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.owner_id,
            name: entry.name,
            entry_type: entry.entry_type,
            is_public: entry.is_public,
            parent_id: entry.parent_id,
        }
    }
}

/// Data for creating a new entry.
#[derive(Debug, Clone)]
pub struct NewEntry {
    /// Owning user ID.
    pub owner_id: i64,
    /// Display name.
    pub name: String,
    /// Entry kind.
    pub entry_type: EntryType,
    /// Public visibility.
    pub is_public: bool,
    /// Containing folder.
    pub parent_id: Option<i64>,
    /// Blob store key.
    pub content_id: Option<String>,
}

impl NewEntry {
    /// Create a private, top-level entry without content.
    pub fn new(owner_id: i64, name: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            owner_id,
            name: name.into(),
            entry_type,
            is_public: false,
            parent_id: None,
            content_id: None,
        }
    }

    /// Set the containing folder.
    pub fn with_parent(mut self, parent_id: Option<i64>) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Set the public visibility.
    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    /// Set the blob store key.
    pub fn with_content(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_parse() {
        assert_eq!("folder".parse::<EntryType>(), Ok(EntryType::Folder));
        assert_eq!("file".parse::<EntryType>(), Ok(EntryType::File));
        assert_eq!("image".parse::<EntryType>(), Ok(EntryType::Image));
        assert!("Folder".parse::<EntryType>().is_err());
        assert!("video".parse::<EntryType>().is_err());
        assert!("".parse::<EntryType>().is_err());
    }

    #[test]
    fn test_entry_type_has_content() {
        assert!(!EntryType::Folder.has_content());
        assert!(EntryType::File.has_content());
        assert!(EntryType::Image.has_content());
    }

    #[test]
    fn test_view_serialization() {
        let entry = Entry {
            id: 7,
            owner_id: 3,
            name: "a.png".to_string(),
            entry_type: EntryType::Image,
            is_public: false,
            parent_id: Some(2),
            content_id: Some("0b1c".to_string()),
            created_at: "2024-01-01 00:00:00".to_string(),
        };

        let json = serde_json::to_value(entry.view()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "userId": 3,
                "name": "a.png",
                "type": "image",
                "isPublic": false,
                "parentId": 2
            })
        );
    }

    #[test]
    fn test_view_omits_missing_parent() {
        let view = EntryView {
            id: 1,
            user_id: 1,
            name: "Photos".to_string(),
            entry_type: EntryType::Folder,
            is_public: false,
            parent_id: None,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("parentId").is_none());
        assert!(json.get("contentId").is_none());
    }
}
