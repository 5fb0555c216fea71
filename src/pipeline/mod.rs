//! Pipeline entry points for monitor operations.
//!
//! - `run_check`: Fetch, classify and archive a list of URLs
//! - `run_history`: Show the stored versions of one URL
//! - `run_snapshots`: Show the archived buckets of one domain

pub mod check;
pub mod history;
pub mod snapshots;

pub use check::{CheckStats, run_check};
pub use history::run_history;
pub use snapshots::{SnapshotBucket, run_snapshots};
