// src/models/mod.rs

//! Domain models for the monitor.
//!
//! This module contains all data structures shared across services,
//! storage and the CLI, organized by their primary purpose.

mod config;
mod content;
mod outcome;
mod record;

// Re-export all public types
pub use config::{Config, LoggingConfig, MonitorConfig, PathsConfig};
pub use content::{ContentKind, HashAlgorithm};
pub use outcome::{Outcome, UnchangedReason};
pub use record::{ResourceHistory, VersionRecord};
