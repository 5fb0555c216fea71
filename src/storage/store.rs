//! Version store: latest hash and version history per canonical resource.
//!
//! The whole map sits behind one async mutex. Every read, update and save
//! is serialized through it, including the file write during a save, so two
//! saves never interleave on disk.
//!
//! The persisted form is a single pretty-printed JSON object:
//!
//! ```text
//! {
//!   "https://ex.com/a.js": {
//!     "latest_hash": "…",
//!     "history": [{ "hash": "…", "path": "…", "timestamp": "2026-01-01_10" }]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{ResourceHistory, VersionRecord};
use crate::utils::fs;

/// How a recorded version related to what the store already knew.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    /// First version of the resource
    New,
    /// Replaced a different latest hash; carries the previous version's file
    Changed { previous: Option<PathBuf> },
    /// The hash was already the latest one; nothing was appended
    Unchanged,
}

/// Concurrency-safe map of canonical identity to resource history.
#[derive(Debug, Default)]
pub struct VersionStore {
    path: Option<PathBuf>,
    data: Mutex<BTreeMap<String, ResourceHistory>>,
}

impl VersionStore {
    /// Create an empty store that is not backed by a file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path`.
    ///
    /// A missing or empty file gives an empty store. A file that is not a
    /// valid store document is discarded with a warning rather than failing
    /// the run. Other read failures are errors.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => match parse(&bytes) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!(
                        "Store file {} is malformed ({}); starting with an empty store",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No store at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        log::debug!("Loaded {} resources from {}", data.len(), path.display());
        Ok(Self {
            path: Some(path),
            data: Mutex::new(data),
        })
    }

    /// Latest stored hash for a resource.
    pub async fn latest_hash(&self, id: &str) -> Option<String> {
        let data = self.data.lock().await;
        data.get(id).map(|h| h.latest_hash.clone())
    }

    /// Archived file of the most recent version, if any version exists.
    pub async fn last_file(&self, id: &str) -> Option<PathBuf> {
        let data = self.data.lock().await;
        data.get(id).and_then(|h| h.last()).map(|r| r.path.clone())
    }

    /// Append a version and make it the latest, creating the history if needed.
    pub async fn update(
        &self,
        id: &str,
        hash: &str,
        path: impl Into<PathBuf>,
        timestamp: &str,
    ) {
        let mut data = self.data.lock().await;
        data.entry(id.to_string()).or_default().push(VersionRecord {
            hash: hash.to_string(),
            path: path.into(),
            timestamp: timestamp.to_string(),
        });
    }

    /// Classify and append a version under a single lock.
    ///
    /// Nothing is appended when `record.hash` already is the latest hash, so
    /// two tasks racing on the same resource cannot both record one version.
    pub async fn record(&self, id: &str, record: VersionRecord) -> Recorded {
        let mut data = self.data.lock().await;
        let outcome = match data.get(id) {
            None => Recorded::New,
            Some(history) if history.latest_hash == record.hash => return Recorded::Unchanged,
            Some(history) => Recorded::Changed {
                previous: history.last().map(|r| r.path.clone()),
            },
        };
        data.entry(id.to_string()).or_default().push(record);
        outcome
    }

    /// Full history of one resource.
    pub async fn history(&self, id: &str) -> Option<ResourceHistory> {
        let data = self.data.lock().await;
        data.get(id).cloned()
    }

    /// Copy of the whole mapping.
    pub async fn snapshot(&self) -> BTreeMap<String, ResourceHistory> {
        self.data.lock().await.clone()
    }

    /// Number of tracked resources.
    pub async fn len(&self) -> usize {
        self.data.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.lock().await.is_empty()
    }

    /// Save to the file the store was loaded from. No-op for in-memory stores.
    pub async fn persist(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.save_to(path).await,
            None => Ok(()),
        }
    }

    /// Write the whole mapping to `destination`. An empty path is a no-op.
    ///
    /// The document is written to a temporary file and renamed over the
    /// destination so readers never see a half-written store.
    pub async fn save_to(&self, destination: &Path) -> Result<()> {
        if destination.as_os_str().is_empty() {
            return Ok(());
        }

        let data = self.data.lock().await;
        let bytes = serde_json::to_vec_pretty(&*data)?;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = fs::sibling_path(destination, ".tmp");
        fs::write_replace(destination, &tmp, &bytes).await?;
        log::debug!("Saved {} resources to {}", data.len(), destination.display());
        Ok(())
    }
}

/// Parse a store document, skipping `null` entries.
fn parse(bytes: &[u8]) -> Result<BTreeMap<String, ResourceHistory>> {
    let raw: BTreeMap<String, Option<ResourceHistory>> = serde_json::from_slice(bytes)?;
    Ok(raw
        .into_iter()
        .filter_map(|(id, history)| history.map(|h| (id, h)))
        .collect())
}
