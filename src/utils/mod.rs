//! Utility functions and helpers.

pub mod fs;
pub mod log;
pub mod url;

use chrono::{DateTime, Local, TimeZone};

/// Format of the hour bucket used in archive paths and version records.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H";

/// Current hour bucket on the local clock.
pub fn timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Hour bucket for the given instant.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}
