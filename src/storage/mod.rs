//! Storage for observed versions.
//!
//! - `store`: the JSON version index (latest hash and history per resource)
//! - `archive`: the content-addressable directory tree holding each version's bytes
//!
//! The store only ever references archive files that were written
//! successfully; the monitor archives first and records second.

pub mod archive;
pub mod store;

// Re-export for convenience
pub use archive::{Archived, ContentArchive};
pub use store::{Recorded, VersionStore};
