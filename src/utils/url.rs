// src/utils/url.rs

//! URL identity helpers.

use url::{ParseError, Url};

use crate::error::Result;

/// Parse an absolute URL that names a host.
pub fn parse(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ParseError::EmptyHost.into());
    }
    Ok(url)
}

/// Canonical identity of a resource: scheme, host (and explicit port) and path.
///
/// Query string and fragment are dropped so URL variants of one file share a
/// history.
///
/// # Examples
/// ```
/// use radarlance::utils::url::{canonical_id, parse};
///
/// let url = parse("https://ex.com/app.js?v=3#top").unwrap();
/// assert_eq!(canonical_id(&url), "https://ex.com/app.js");
/// ```
pub fn canonical_id(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

/// Host name used as the archive's top-level directory.
pub fn domain(url: &Url) -> String {
    url.host_str().unwrap_or("").to_string()
}

/// Resource path relative to the host root, without the leading slash.
pub fn resource_path(url: &Url) -> &str {
    url.path().trim_start_matches('/')
}
