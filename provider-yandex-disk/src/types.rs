//! Yandex Disk API response types
//!
//! Data structures for deserializing resource listing and download
//! responses.

use serde::Deserialize;

/// One item of a resource listing
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceItem {
    /// Remote path, unique across the disk
    pub path: String,

    /// Display name
    pub name: String,

    /// Resource type: `file` or `dir`
    #[serde(rename = "type")]
    pub kind: String,

    /// Creation time (RFC 3339)
    pub created: String,

    /// Modification time (RFC 3339)
    pub modified: String,
}

/// Resource listing response
///
/// The item list and the pagination cursor live under `_embedded`; both the
/// wrapper and the cursor may be absent.
#[derive(Debug, Deserialize)]
pub struct ResourceList {
    #[serde(rename = "_embedded", default)]
    pub embedded: Embedded,
}

#[derive(Debug, Default, Deserialize)]
pub struct Embedded {
    /// Items of the current page, in server order
    #[serde(default)]
    pub items: Vec<ResourceItem>,

    /// Opaque continuation URL for the next page, absent on the last page
    pub next: Option<String>,
}

/// Download resolution response
#[derive(Debug, Deserialize)]
pub struct DownloadLink {
    /// Ephemeral download URL
    pub href: Option<String>,
}
