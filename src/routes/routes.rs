//! Defines the browser's only route.
//!
//! ## Structure
//! - `GET /`        : listing of the bucket root
//! - `GET /{*path}` : an object, or a listing of the prefix, or 404
//!
//! Every path belongs to the bucket, so nothing else is mounted: a health
//! endpoint would shadow a key of the same name.

use crate::{handlers::browse_handlers::browse, services::resolver::PathResolver};
use axum::{Router, routing::get};

/// Build and return the router.
///
/// The router carries the shared `PathResolver` (and through it the single
/// object-store client) to every request.
pub fn routes() -> Router<PathResolver> {
    Router::new()
        .route("/", get(browse))
        .route("/{*path}", get(browse))
}
