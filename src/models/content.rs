//! Content kind and digest algorithm selectors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of text resource being watched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentKind {
    #[default]
    Js,
    Html,
}

impl ContentKind {
    /// Parse a content type name. Anything other than `html` means JavaScript.
    pub fn parse(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("html") {
            Self::Html
        } else {
            Self::Js
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Html => "html",
        }
    }

    /// File name used when a URL has no usable path.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Js => "index.js",
            Self::Html => "index.html",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ContentKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ContentKind> for String {
    fn from(value: ContentKind) -> Self {
        value.as_str().to_string()
    }
}

/// Digest algorithm for change detection and archive addressing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// 160-bit SHA-1, the format of existing stores
    #[default]
    Sha1,
    Sha256,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => f.write_str("sha1"),
            Self::Sha256 => f.write_str("sha256"),
        }
    }
}
