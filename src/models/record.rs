//! Version history records persisted in the store document.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One archived version of a resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionRecord {
    /// Digest of the stored content
    pub hash: String,

    /// Archived file for this version
    pub path: PathBuf,

    /// Hour bucket of the first observation (`YYYY-MM-DD_HH`)
    pub timestamp: String,
}

/// All known versions of one canonical resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceHistory {
    /// Digest of the most recently stored version
    #[serde(default)]
    pub latest_hash: String,

    /// Versions in observation order
    #[serde(default)]
    pub history: Vec<VersionRecord>,
}

impl ResourceHistory {
    /// Append a version and make it the latest.
    pub fn push(&mut self, record: VersionRecord) {
        self.latest_hash = record.hash.clone();
        self.history.push(record);
    }

    pub fn last(&self) -> Option<&VersionRecord> {
        self.history.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_tracks_latest_hash() {
        let mut history = ResourceHistory::default();
        history.push(VersionRecord {
            hash: "aaa".into(),
            path: PathBuf::from("data/ex.com/2026-01-01_10/aaa/a.js"),
            timestamp: "2026-01-01_10".into(),
        });
        history.push(VersionRecord {
            hash: "bbb".into(),
            path: PathBuf::from("data/ex.com/2026-01-01_11/bbb/a.js"),
            timestamp: "2026-01-01_11".into(),
        });

        assert_eq!(history.latest_hash, "bbb");
        assert_eq!(history.history.len(), 2);
        assert_eq!(history.last().map(|r| r.hash.as_str()), Some("bbb"));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{"latest_hash":"abc","history":[],"owner":"someone"}"#;
        let history: ResourceHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.latest_hash, "abc");
        assert!(history.history.is_empty());
    }
}
