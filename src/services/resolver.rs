//! src/services/resolver.rs
//!
//! PathResolver: turns a request path into either an object to stream or a
//! synthetic directory listing. The bucket is flat; "directories" exist only
//! as key prefixes, so every decision here is made from key strings and the
//! store's per-object markers.
//!
//! Resolution order is fixed: exact key first, prefix second. An object
//! `a/b` therefore always wins over the prefix `a/b/` when both exist.

use crate::{
    config::StatFailureMode,
    models::{
        entry::{DirectoryEntry, base_name},
        object::{ObjectKind, ObjectMeta},
    },
    services::object_store::{ObjectStore, ObjectStream, StoreError},
};
use futures::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

const DELIMITER: &str = "/";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Known suffixes and the content type served for them.
const CONTENT_TYPES: [(&str, &str); 9] = [
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("pdf", "application/pdf"),
];

/// An object confirmed to exist, ready to be streamed.
pub struct ResolvedFile {
    pub meta: ObjectMeta,
    pub content_type: &'static str,
    pub body: ObjectStream,
}

/// A non-empty virtual directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Header path, always `/` + prefix.
    pub path: String,
    /// `..` first (unless root), then children in store order.
    pub entries: Vec<DirectoryEntry>,
}

pub enum Resolution {
    File(ResolvedFile),
    Directory(DirectoryListing),
    NotFound,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not stat `{key}`: {source}")]
    Stat {
        key: String,
        #[source]
        source: StoreError,
    },
}

/// Shared by all handlers; cloning only bumps the store's refcount.
#[derive(Clone)]
pub struct PathResolver {
    store: Arc<dyn ObjectStore>,
    on_stat_error: StatFailureMode,
}

impl PathResolver {
    pub fn new(store: Arc<dyn ObjectStore>, on_stat_error: StatFailureMode) -> Self {
        Self {
            store,
            on_stat_error,
        }
    }

    /// Resolve a raw (already percent-decoded) request path.
    pub async fn resolve(&self, request_path: &str) -> Result<Resolution, ResolveError> {
        let key = request_path.strip_prefix('/').unwrap_or(request_path);

        if let Some(file) = self.resolve_file(key).await? {
            debug!(key, size = file.meta.size, "resolved as file");
            return Ok(Resolution::File(file));
        }

        if let Some(listing) = self.resolve_directory(key).await {
            debug!(key, entries = listing.entries.len(), "resolved as directory");
            return Ok(Resolution::Directory(listing));
        }

        debug!(key, "not found");
        Ok(Resolution::NotFound)
    }

    /// Try `key` as an exact object.
    ///
    /// `Ok(None)` means "not a file, try something else". An error is only
    /// returned in `StatFailureMode::ServerError`.
    pub async fn resolve_file(&self, key: &str) -> Result<Option<ResolvedFile>, ResolveError> {
        // The bucket root is never an object.
        if key.is_empty() {
            return Ok(None);
        }

        let meta = match self.store.stat(key).await {
            Ok(meta) => meta,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => {
                warn!(key, error = %err, "stat failed");
                return match self.on_stat_error {
                    StatFailureMode::FallThrough => Ok(None),
                    StatFailureMode::ServerError => Err(ResolveError::Stat {
                        key: key.to_string(),
                        source: err,
                    }),
                };
            }
        };

        if meta.classify() == ObjectKind::DirectoryPlaceholder {
            debug!(key, "stat found a directory placeholder");
            return Ok(None);
        }

        let body = match self.store.get(key).await {
            Ok(body) => body,
            Err(err) => {
                error!(key, error = %err, "fetching object failed");
                return Ok(None);
            }
        };

        Ok(Some(ResolvedFile {
            content_type: content_type_for(key),
            meta,
            body,
        }))
    }

    /// Try `key` as a prefix with at least one immediate child.
    pub async fn resolve_directory(&self, key: &str) -> Option<DirectoryListing> {
        let prefix = directory_prefix(key);

        let mut children = Vec::new();
        let mut listing = self.store.list(&prefix, DELIMITER);
        while let Some(item) = listing.next().await {
            let entry = match item {
                Ok(entry) => entry,
                Err(err) => {
                    error!(prefix = %prefix, error = %err, "listing failed");
                    return None;
                }
            };

            // The placeholder for the prefix itself is not a child.
            if entry.key == prefix {
                continue;
            }

            children.push(match entry.classify() {
                ObjectKind::DirectoryPlaceholder => {
                    DirectoryEntry::directory(base_name(&entry.key), &entry.key)
                }
                ObjectKind::File => DirectoryEntry::file(&entry),
            });
        }

        if children.is_empty() {
            return None;
        }

        let mut entries = Vec::with_capacity(children.len() + 1);
        if let Some(parent) = parent_prefix(&prefix) {
            entries.push(DirectoryEntry::parent(parent));
        }
        entries.extend(children);

        Some(DirectoryListing {
            path: format!("/{}", prefix),
            entries,
        })
    }
}

/// Normalize a key to the prefix it denotes as a directory: `a` and `a/`
/// become `a/`; both `` and `/` are the bucket root.
pub fn directory_prefix(key: &str) -> String {
    if key.is_empty() || key == "/" {
        String::new()
    } else if key.ends_with('/') {
        key.to_string()
    } else {
        format!("{}/", key)
    }
}

/// Prefix one level up from `prefix`, or `None` at the root.
/// `a/b/` → `a/`, `a/` → `` (root).
pub fn parent_prefix(prefix: &str) -> Option<&str> {
    if prefix.is_empty() {
        return None;
    }
    let trimmed = prefix.strip_suffix('/').unwrap_or(prefix);
    Some(match trimmed.rfind('/') {
        Some(idx) => &trimmed[..=idx],
        None => "",
    })
}

/// Content type for a key from its extension, case-insensitively.
pub fn content_type_for(key: &str) -> &'static str {
    let name = key.rsplit('/').next().unwrap_or(key);
    let Some((_, ext)) = name.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE;
    };
    CONTENT_TYPES
        .iter()
        .find(|(suffix, _)| suffix.eq_ignore_ascii_case(ext))
        .map(|(_, content_type)| *content_type)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
