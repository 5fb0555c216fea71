//! Content normalization before hashing and archiving.
//!
//! A failed normalization never stops the pipeline; the monitor stores the
//! raw body instead.

pub mod html;
pub mod js;

use crate::error::Result;
use crate::models::ContentKind;

/// Turns fetched text into a canonical, diffable form.
pub trait Normalizer: Send + Sync {
    fn beautify(&self, raw: &str, kind: ContentKind) -> Result<String>;
}

/// Type-dependent beautifier for JS and HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct Beautifier;

impl Normalizer for Beautifier {
    fn beautify(&self, raw: &str, kind: ContentKind) -> Result<String> {
        match kind {
            ContentKind::Js => js::beautify(raw),
            ContentKind::Html => html::beautify(raw),
        }
    }
}

/// Stores content exactly as fetched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Normalizer for Passthrough {
    fn beautify(&self, raw: &str, _kind: ContentKind) -> Result<String> {
        Ok(raw.to_string())
    }
}
