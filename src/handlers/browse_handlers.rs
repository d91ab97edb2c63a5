//! HTTP handler for the single catch-all route.
//! Streams object bodies to avoid buffering in memory and delegates path
//! resolution to `PathResolver`.

use crate::{
    errors::AppError,
    services::resolver::{PathResolver, Resolution, ResolvedFile},
    views::listing::render_listing,
};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use futures::TryStreamExt;
use tracing::warn;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// `GET /{*path}`: serve an object, or a listing of the prefix, or 404.
pub async fn browse(
    State(resolver): State<PathResolver>,
    uri: Uri,
) -> Result<Response, AppError> {
    // A path that does not decode to UTF-8 cannot name a key.
    let path = urlencoding::decode(uri.path()).map_err(|_| AppError::not_found())?;

    match resolver.resolve(&path).await? {
        Resolution::File(file) => Ok(file_response(file)),
        Resolution::Directory(listing) => Ok(Html(render_listing(&listing)).into_response()),
        Resolution::NotFound => Err(AppError::not_found()),
    }
}

fn file_response(file: ResolvedFile) -> Response {
    let key = file.meta.key.clone();
    let body = file.body.inspect_err(move |err| {
        warn!(key = %key, error = %err, "object transfer interrupted");
    });

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(file.content_type),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(file.meta.size));
    if let Some(modified) = file.meta.last_modified {
        let value = modified.format(HTTP_DATE_FORMAT).to_string();
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(header::LAST_MODIFIED, value);
        }
    }
    response
}
