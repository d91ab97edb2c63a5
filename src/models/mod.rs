//! Core data models for the bucket browser.
//!
//! `object` holds what the store reports about keys; `entry` holds the
//! per-request view model rendered into listings. Nothing here outlives a
//! single request.

pub mod entry;
pub mod object;
