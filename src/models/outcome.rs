//! Classification of a single observation.

use std::path::PathBuf;

/// Why a check concluded nothing changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnchangedReason {
    /// Raw body digest equals the stored latest hash; nothing was normalized
    RawHashMatch,
    /// Normalized content digest equals the stored latest hash
    StoredHashMatch,
}

/// Result of checking one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// First version ever seen for this resource
    New { path: PathBuf },
    /// Content differs from the latest stored version
    Changed {
        old_path: Option<PathBuf>,
        new_path: PathBuf,
    },
    Unchanged { reason: UnchangedReason },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::New { .. } => "NEW",
            Self::Changed { .. } => "CHANGED",
            Self::Unchanged { .. } => "UNCHANGED",
        }
    }

    /// Whether this outcome appended a version to the store.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }
}
