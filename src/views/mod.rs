//! Presentation of resolved listings.

pub mod listing;
