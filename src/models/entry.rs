//! Rows of a rendered directory listing.

use chrono::{DateTime, Utc};

use crate::models::object::ListEntry;

/// Size column shown for directories.
pub const DIRECTORY_SIZE: &str = "-";

/// Which icon a listing row gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Directory,
    File,
}

/// A single row in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Display name (basename of the key, or `..`).
    pub name: String,

    /// Absolute request path the row links to (`/` + key).
    pub url: String,

    pub is_dir: bool,

    /// Human-readable size, `-` for directories.
    pub size: String,

    /// Last modification time; directories have none.
    pub modified: Option<DateTime<Utc>>,

    pub icon: Icon,
}

impl DirectoryEntry {
    /// The synthetic `..` row pointing at `parent_prefix`.
    pub fn parent(parent_prefix: &str) -> Self {
        Self::directory("..", parent_prefix)
    }

    /// A row for a sub-prefix or directory placeholder.
    pub fn directory(name: impl Into<String>, key: &str) -> Self {
        Self {
            name: name.into(),
            url: format!("/{}", key),
            is_dir: true,
            size: DIRECTORY_SIZE.to_string(),
            modified: None,
            icon: Icon::Directory,
        }
    }

    /// A row for a real object.
    pub fn file(entry: &ListEntry) -> Self {
        Self {
            name: base_name(&entry.key).to_string(),
            url: format!("/{}", entry.key),
            is_dir: false,
            size: format_size(entry.size),
            modified: entry.last_modified,
            icon: Icon::File,
        }
    }
}

/// Last path element of a key, ignoring trailing slashes.
pub fn base_name(key: &str) -> &str {
    let trimmed = key.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Render a byte count the way `ls -h` style listings do: `512 B`, `1.5 KB`.
pub fn format_size(size: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if size < UNIT {
        return format!("{} B", size);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = size / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}B", size as f64 / div as f64, PREFIXES[exp])
}
