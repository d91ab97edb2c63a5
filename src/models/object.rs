//! Represents what the bucket tells us about a single key.
//!
//! Object stores have no real directories. Whether a key stands for a
//! "folder" is inferred from store-specific markers, and those conventions
//! live here so the resolver never compares marker strings itself.

use chrono::{DateTime, Utc};

/// Content type S3-compatible stores attach to directory placeholder objects.
pub const DIRECTORY_CONTENT_TYPE: &str = "application/x-directory";

/// What a key turned out to be once its markers are inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A real object with retrievable content.
    File,
    /// A marker standing in for a virtual directory.
    DirectoryPlaceholder,
}

/// Metadata returned by a stat of one exact key.
#[derive(Debug, Clone)]
pub struct ObjectMeta {
    /// Object key (no leading slash).
    pub key: String,

    /// Size in bytes.
    pub size: u64,

    /// Timestamp when object was last modified, if the store reported one.
    pub last_modified: Option<DateTime<Utc>>,

    /// Content type (MIME type) stored with the object.
    pub content_type: Option<String>,
}

impl ObjectMeta {
    /// Classify a stat result.
    ///
    /// A key ending in `/` or carrying the `application/x-directory` content
    /// type is a directory placeholder; its body is never worth serving.
    pub fn classify(&self) -> ObjectKind {
        let is_marker_type = self
            .content_type
            .as_deref()
            .map(|ct| ct.eq_ignore_ascii_case(DIRECTORY_CONTENT_TYPE))
            .unwrap_or(false);

        if is_marker_type || self.key.ends_with('/') {
            ObjectKind::DirectoryPlaceholder
        } else {
            ObjectKind::File
        }
    }
}

/// One member of a delimited listing.
///
/// Grouped sub-prefixes come back from the store as entries without a
/// storage class; real objects always carry one.
#[derive(Debug, Clone)]
pub struct ListEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub storage_class: Option<String>,
}

impl ListEntry {
    /// Entry for a common prefix (a grouped "subdirectory").
    pub fn common_prefix(prefix: impl Into<String>) -> Self {
        Self {
            key: prefix.into(),
            size: 0,
            last_modified: None,
            storage_class: None,
        }
    }

    /// Classify a listing member by its storage-class marker.
    pub fn classify(&self) -> ObjectKind {
        match self.storage_class.as_deref() {
            Some(class) if !class.is_empty() => ObjectKind::File,
            _ => ObjectKind::DirectoryPlaceholder,
        }
    }
}
