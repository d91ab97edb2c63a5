//! In-memory `ObjectStore` used by the test suite.
//!
//! Keys are kept in a `BTreeMap` so listings come back in lexicographic
//! order, like S3. Failures can be injected per key (stat, get) or after a
//! number of listing entries.

use crate::models::object::{DIRECTORY_CONTENT_TYPE, ListEntry, ObjectMeta};
use crate::services::object_store::{
    ListStream, ObjectStore, ObjectStream, StoreError, StoreResult,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use futures::{StreamExt, stream};
use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    io,
};

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    last_modified: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: BTreeMap<String, StoredObject>,
    failing_stats: HashSet<String>,
    failing_gets: HashSet<String>,
    failing_bodies: HashSet<String>,
    list_fails_after: Option<usize>,
}

/// Fixed timestamp so rendered listings are stable across runs.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 15)
        .single()
        .unwrap_or_default()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, key: &str, data: impl Into<Bytes>) -> Self {
        self.objects.insert(
            key.to_string(),
            StoredObject {
                data: data.into(),
                content_type: Some("binary/octet-stream".into()),
                last_modified: fixed_time(),
            },
        );
        self
    }

    /// A zero-byte directory marker as MinIO creates them.
    pub fn with_placeholder(mut self, key: &str) -> Self {
        self.objects.insert(
            key.to_string(),
            StoredObject {
                data: Bytes::new(),
                content_type: Some(DIRECTORY_CONTENT_TYPE.into()),
                last_modified: fixed_time(),
            },
        );
        self
    }

    pub fn failing_stat(mut self, key: &str) -> Self {
        self.failing_stats.insert(key.to_string());
        self
    }

    pub fn failing_get(mut self, key: &str) -> Self {
        self.failing_gets.insert(key.to_string());
        self
    }

    /// The body stream yields one chunk and then an I/O error.
    pub fn failing_body(mut self, key: &str) -> Self {
        self.failing_bodies.insert(key.to_string());
        self
    }

    /// Listings yield `count` entries and then an error.
    pub fn failing_list_after(mut self, count: usize) -> Self {
        self.list_fails_after = Some(count);
        self
    }

    fn lookup(&self, key: &str) -> StoreResult<&StoredObject> {
        self.objects.get(key).ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })
    }

    /// Delimited listing: immediate objects plus one entry per sub-prefix.
    fn entries_under(&self, prefix: &str, delimiter: &str) -> Vec<ListEntry> {
        let mut seen_prefixes = BTreeSet::new();
        let mut entries = Vec::new();
        for (key, obj) in self.objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            if let Some(common) = compute_common_prefix(key, prefix, delimiter) {
                if seen_prefixes.insert(common.clone()) {
                    entries.push(ListEntry::common_prefix(common));
                }
                continue;
            }
            entries.push(ListEntry {
                key: key.clone(),
                size: obj.data.len() as u64,
                last_modified: Some(obj.last_modified),
                storage_class: Some("STANDARD".into()),
            });
        }
        entries
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn stat(&self, key: &str) -> StoreResult<ObjectMeta> {
        if self.failing_stats.contains(key) {
            return Err(StoreError::Unavailable(format!("stat of `{}` timed out", key)));
        }
        let obj = self.lookup(key)?;
        Ok(ObjectMeta {
            key: key.to_string(),
            size: obj.data.len() as u64,
            last_modified: Some(obj.last_modified),
            content_type: obj.content_type.clone(),
        })
    }

    async fn get(&self, key: &str) -> StoreResult<ObjectStream> {
        if self.failing_gets.contains(key) {
            return Err(StoreError::Unavailable(format!("get of `{}` refused", key)));
        }
        let data = self.lookup(key)?.data.clone();

        if self.failing_bodies.contains(key) {
            let half = data.slice(..data.len() / 2);
            let chunks: Vec<io::Result<Bytes>> = vec![
                Ok(half),
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away")),
            ];
            return Ok(stream::iter(chunks).boxed());
        }

        // Split into two chunks so consumers really have to stream.
        let mid = data.len() / 2;
        let chunks: Vec<io::Result<Bytes>> = vec![Ok(data.slice(..mid)), Ok(data.slice(mid..))];
        Ok(stream::iter(chunks).boxed())
    }

    fn list(&self, prefix: &str, delimiter: &str) -> ListStream {
        let entries = self.entries_under(prefix, delimiter);
        let mut items: Vec<StoreResult<ListEntry>> = Vec::new();
        for (idx, entry) in entries.into_iter().enumerate() {
            if self.list_fails_after == Some(idx) {
                break;
            }
            items.push(Ok(entry));
        }
        if let Some(limit) = self.list_fails_after {
            if items.len() == limit {
                items.push(Err(StoreError::Unavailable(format!(
                    "listing `{}` interrupted",
                    prefix
                ))));
            }
        }
        stream::iter(items).boxed()
    }
}

/// Group `key` under its first sub-prefix below `prefix`, if it has one.
fn compute_common_prefix(key: &str, prefix: &str, delimiter: &str) -> Option<String> {
    let after_prefix = key.strip_prefix(prefix)?;
    let pos = after_prefix.find(delimiter)?;
    let mut combined = String::from(prefix);
    combined.push_str(&after_prefix[..pos + delimiter.len()]);
    Some(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[test]
    fn common_prefix_stops_at_first_delimiter() {
        assert_eq!(
            compute_common_prefix("a/b/c/d", "a/", "/").as_deref(),
            Some("a/b/")
        );
        assert_eq!(compute_common_prefix("a/file", "a/", "/"), None);
        assert_eq!(compute_common_prefix("other", "a/", "/"), None);
    }

    #[tokio::test]
    async fn listing_groups_deeper_keys() {
        let store = MemoryStore::new()
            .with_object("a/one", "1")
            .with_object("a/sub/two", "2")
            .with_object("a/sub/deeper/three", "3")
            .with_object("b", "4");

        let keys: Vec<String> = store
            .list("a/", "/")
            .map_ok(|e| e.key)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(keys, vec!["a/one", "a/sub/"]);
    }

    #[tokio::test]
    async fn listing_error_is_injected_after_count() {
        let store = MemoryStore::new()
            .with_object("x/1", "1")
            .with_object("x/2", "2")
            .failing_list_after(1);

        let items: Vec<_> = store.list("x/", "/").collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }
}
