//! Domain model for mirrored disk resources.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Kind of a mirrored resource.
///
/// Serialized as `"file"` / `"dir"`, matching the wire values of the remote
/// listing API and the `kind` column in the mirror database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Dir => "dir",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file or directory mirrored from the remote disk.
///
/// The remote path is the identity of an entry; hierarchy is implicit, a
/// directory's descendants are the entries whose path it prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Entry {
    /// Remote path, globally unique.
    pub path: String,
    /// Display name, typically the last path segment.
    pub name: String,
    pub kind: EntryKind,
    /// Creation time, Unix seconds.
    pub created_at: i64,
    /// Last modification time, Unix seconds.
    pub modified_at: i64,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_representation() {
        assert_eq!(serde_json::to_string(&EntryKind::File).unwrap(), "\"file\"");
        assert_eq!(serde_json::to_string(&EntryKind::Dir).unwrap(), "\"dir\"");

        let kind: EntryKind = serde_json::from_str("\"dir\"").unwrap();
        assert_eq!(kind, EntryKind::Dir);
    }

    #[test]
    fn test_entry_is_dir() {
        let entry = Entry {
            path: "/documents".to_string(),
            name: "documents".to_string(),
            kind: EntryKind::Dir,
            created_at: 1700000000,
            modified_at: 1700000000,
        };

        assert!(entry.is_dir());
        assert_eq!(entry.kind.to_string(), "dir");
    }
}
