//! `ObjectStore` backed by an S3-compatible endpoint (MinIO, AWS, ...).
//!
//! Uses path-style addressing so custom endpoints without wildcard DNS work.
//! Listings page through ListObjectsV2 lazily: the next page is only
//! requested once the previous one has been consumed.

use crate::models::object::{ListEntry, ObjectMeta};
use crate::services::object_store::{
    ListStream, ObjectStore, ObjectStream, StoreError, StoreResult,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt, stream};
use s3::{bucket::Bucket, creds::Credentials, error::S3Error, region::Region};
use std::{io, sync::Arc};
use tracing::debug;

/// Connection settings for one bucket.
#[derive(Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

pub struct S3Store {
    bucket: Arc<Bucket>,
}

/// Where a paged listing stands between pages.
enum Cursor {
    Start,
    Next(String),
    Done,
}

impl S3Store {
    /// Build a client for `settings.bucket`. No request is made here; an
    /// unreachable endpoint only shows up on the first stat or list.
    pub fn connect(settings: &S3Settings) -> anyhow::Result<Self> {
        let credentials = match (&settings.access_key, &settings.secret_key) {
            (None, None) => Credentials::anonymous().context("building anonymous credentials")?,
            (access, secret) => Credentials::new(
                access.as_deref(),
                secret.as_deref(),
                None,
                None,
                None,
            )
            .context("building static credentials")?,
        };

        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
        };

        let bucket = Bucket::new(&settings.bucket, region, credentials)
            .with_context(|| format!("configuring bucket `{}`", settings.bucket))?
            .with_path_style();

        Ok(Self {
            bucket: Arc::from(bucket),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn stat(&self, key: &str) -> StoreResult<ObjectMeta> {
        let (head, status) = self
            .bucket
            .head_object(key)
            .await
            .map_err(|err| map_not_found(err, key))?;
        check_status(status, key)?;

        Ok(ObjectMeta {
            key: key.to_string(),
            size: object_size(head.content_length, key)?,
            last_modified: head.last_modified.as_deref().and_then(parse_http_date),
            content_type: head.content_type,
        })
    }

    async fn get(&self, key: &str) -> StoreResult<ObjectStream> {
        let response = self
            .bucket
            .get_object_stream(key)
            .await
            .map_err(|err| map_not_found(err, key))?;
        check_status(response.status_code, key)?;

        Ok(response.bytes.map_err(io::Error::other).boxed())
    }

    fn list(&self, prefix: &str, delimiter: &str) -> ListStream {
        let bucket = self.bucket.clone();
        let prefix = prefix.to_string();
        let delimiter = delimiter.to_string();

        let pages = stream::try_unfold(Cursor::Start, move |cursor| {
            let bucket = bucket.clone();
            let prefix = prefix.clone();
            let delimiter = delimiter.clone();
            async move {
                let token = match cursor {
                    Cursor::Done => return Ok(None),
                    Cursor::Start => None,
                    Cursor::Next(token) => Some(token),
                };

                debug!(prefix = %prefix, has_token = token.is_some(), "listing page");
                let (page, status) = bucket
                    .list_page(prefix.clone(), Some(delimiter), token, None, None)
                    .await?;
                if !(200..300).contains(&status) {
                    return Err(StoreError::Unavailable(format!(
                        "listing `{}` returned HTTP {}",
                        prefix, status
                    )));
                }

                let next = match page.next_continuation_token {
                    Some(token) if page.is_truncated => Cursor::Next(token),
                    _ => Cursor::Done,
                };

                // Objects first, then grouped prefixes, page by page.
                let mut entries: Vec<ListEntry> = page
                    .contents
                    .into_iter()
                    .map(|obj| ListEntry {
                        last_modified: parse_listing_date(&obj.last_modified),
                        key: obj.key,
                        size: obj.size,
                        storage_class: obj.storage_class,
                    })
                    .collect();
                entries.extend(
                    page.common_prefixes
                        .unwrap_or_default()
                        .into_iter()
                        .map(|cp| ListEntry::common_prefix(cp.prefix)),
                );

                Ok(Some((entries, next)))
            }
        });

        pages
            .map_ok(|entries| stream::iter(entries.into_iter().map(Ok::<_, StoreError>)))
            .try_flatten()
            .boxed()
    }
}

/// Turn the store's 404 into `NotFound`; everything else stays a backend error.
fn map_not_found(err: S3Error, key: &str) -> StoreError {
    match err {
        S3Error::HttpFailWithBody(404, _) => StoreError::NotFound {
            key: key.to_string(),
        },
        other => StoreError::S3(other),
    }
}

/// The stat'd size becomes the response's `Content-Length`, so a missing or
/// negative length is a store fault rather than an empty object.
fn object_size(content_length: Option<i64>, key: &str) -> StoreResult<u64> {
    content_length
        .and_then(|len| u64::try_from(len).ok())
        .ok_or_else(|| {
            StoreError::Unavailable(format!("`{}` has no usable Content-Length", key))
        })
}

fn check_status(status: u16, key: &str) -> StoreResult<()> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StoreError::NotFound {
            key: key.to_string(),
        }),
        other => Err(StoreError::Unavailable(format!(
            "`{}` returned HTTP {}",
            key, other
        ))),
    }
}

/// `Last-Modified` header value (RFC 2822 / IMF-fixdate).
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// `LastModified` element of a listing (ISO 8601).
fn parse_listing_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
