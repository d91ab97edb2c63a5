//! Object-store access and path resolution.

#[cfg(test)]
pub mod memory_store;
pub mod object_store;
pub mod resolver;
pub mod s3_store;
