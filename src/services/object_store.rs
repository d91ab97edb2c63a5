//! The object-store seam the resolver consumes.
//!
//! Three primitives are enough to fake a file server on top of a flat key
//! space: stat one key, stream one key, and list one level below a prefix.

use crate::models::object::{ListEntry, ObjectMeta};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::io;
use thiserror::Error;

/// Object body as it arrives from the store.
pub type ObjectStream = BoxStream<'static, io::Result<Bytes>>;

/// Listing members, ending either when the listing is exhausted or at the
/// first error.
pub type ListStream = BoxStream<'static, StoreResult<ListEntry>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{key}` not found")]
    NotFound { key: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    S3(#[from] s3::error::S3Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only access to a single bucket.
///
/// One instance is shared by every in-flight request, so implementations
/// must be safe to call concurrently.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Metadata of exactly `key`. Absent keys yield `StoreError::NotFound`.
    async fn stat(&self, key: &str) -> StoreResult<ObjectMeta>;

    /// Content of exactly `key`.
    async fn get(&self, key: &str) -> StoreResult<ObjectStream>;

    /// Keys starting with `prefix`, with anything past the next `delimiter`
    /// grouped into a single common-prefix entry.
    fn list(&self, prefix: &str, delimiter: &str) -> ListStream;
}
