//! Service layer for the monitor.
//!
//! This module contains the business logic for:
//! - Bounded HTTP fetching (`HttpFetcher`)
//! - Content digests (`Hasher`)
//! - JS/HTML beautification (`Beautifier`)
//! - The per-URL change-detection pipeline (`Monitor`)

pub mod fetcher;
pub mod hasher;
pub mod monitor;
pub mod normalizer;

pub use fetcher::{Fetch, HttpFetcher};
pub use hasher::Hasher;
pub use monitor::Monitor;
pub use normalizer::{Beautifier, Normalizer, Passthrough};
