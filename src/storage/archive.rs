//! Content-addressable archive of fetched versions.
//!
//! ## Storage Layout
//!
//! ```text
//! {base_dir}/
//! └── {domain}/
//!     └── {YYYY-MM-DD_HH}/
//!         └── {content hash}/
//!             └── {original path}/
//!                 └── {file name}
//! ```
//!
//! A given `(domain, timestamp, hash, path)` always maps to the same file and
//! an existing file is never rewritten. Files appear at their final path only
//! once fully written.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{AppError, Result};
use crate::models::ContentKind;
use crate::utils::fs;

/// Distinguishes staging files of concurrent writers within one process.
static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Result of an archive write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archived {
    pub path: PathBuf,
    /// False when the file was already present
    pub created: bool,
}

/// Local filesystem archive rooted at the data directory.
#[derive(Debug, Clone)]
pub struct ContentArchive {
    base_dir: PathBuf,
    kind: ContentKind,
}

impl ContentArchive {
    pub fn new(base_dir: impl Into<PathBuf>, kind: ContentKind) -> Self {
        Self {
            base_dir: base_dir.into(),
            kind,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Location of a version inside the archive.
    ///
    /// Empty, `.` and `..` segments are dropped so a resource path stays inside
    /// its hash directory. A missing file name becomes `index.js` or
    /// `index.html`.
    pub fn entry_path(
        &self,
        domain: &str,
        timestamp: &str,
        content_hash: &str,
        resource_path: &str,
    ) -> PathBuf {
        let mut path = self.base_dir.join(domain).join(timestamp).join(content_hash);

        let segments: Vec<&str> = resource_path
            .split('/')
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .collect();
        let names_file = !resource_path.ends_with('/') && !segments.is_empty();

        for segment in &segments {
            path.push(segment);
        }
        if !names_file {
            path.push(self.kind.default_file_name());
        }
        path
    }

    /// Store `content` unless this exact version is already archived.
    ///
    /// Each writer stages the bytes in its own sibling file and renames it
    /// into place, so the entry path only ever holds complete content.
    pub async fn save(
        &self,
        domain: &str,
        timestamp: &str,
        content_hash: &str,
        resource_path: &str,
        content: impl AsRef<[u8]>,
    ) -> Result<Archived> {
        let path = self.entry_path(domain, timestamp, content_hash, resource_path);

        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| AppError::archive(&path, e))?
        {
            log::debug!("Version already archived at {}", path.display());
            return Ok(Archived {
                path,
                created: false,
            });
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::archive(parent, e))?;
        }

        let staging = fs::sibling_path(
            &path,
            &format!(
                ".{}-{}.tmp",
                std::process::id(),
                STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
            ),
        );
        fs::write_replace(&path, &staging, content.as_ref())
            .await
            .map_err(|e| AppError::archive(&path, e))?;

        Ok(Archived {
            path,
            created: true,
        })
    }

    /// Timestamp buckets archived for a domain, oldest first.
    pub async fn list_timestamps(&self, domain: &str) -> Result<Vec<String>> {
        list_dirs(&self.base_dir.join(domain)).await
    }

    /// Content hashes archived for a domain within one timestamp bucket.
    pub async fn list_hashes(&self, domain: &str, timestamp: &str) -> Result<Vec<String>> {
        list_dirs(&self.base_dir.join(domain).join(timestamp)).await
    }
}

/// Sorted names of the subdirectories of `dir`; a missing directory is empty.
async fn list_dirs(dir: &Path) -> Result<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AppError::Io(e)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_path_layout() {
        let archive = ContentArchive::new("data", ContentKind::Js);
        assert_eq!(
            archive.entry_path("ex.com", "2026-01-01_10", "abc", "static/js/a.js"),
            PathBuf::from("data/ex.com/2026-01-01_10/abc/static/js/a.js")
        );
    }

    #[test]
    fn test_entry_path_defaults_file_name() {
        let js = ContentArchive::new("data", ContentKind::Js);
        let html = ContentArchive::new("data", ContentKind::Html);

        assert_eq!(
            js.entry_path("ex.com", "ts", "h", ""),
            PathBuf::from("data/ex.com/ts/h/index.js")
        );
        assert_eq!(
            html.entry_path("ex.com", "ts", "h", "/"),
            PathBuf::from("data/ex.com/ts/h/index.html")
        );
        assert_eq!(
            html.entry_path("ex.com", "ts", "h", "docs/"),
            PathBuf::from("data/ex.com/ts/h/docs/index.html")
        );
    }

    #[test]
    fn test_entry_path_cannot_escape_hash_dir() {
        let archive = ContentArchive::new("data", ContentKind::Js);
        assert_eq!(
            archive.entry_path("ex.com", "ts", "h", "../../etc/./passwd"),
            PathBuf::from("data/ex.com/ts/h/etc/passwd")
        );
    }

    #[tokio::test]
    async fn test_save_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let archive = ContentArchive::new(tmp.path(), ContentKind::Js);

        let first = archive
            .save("ex.com", "2026-01-01_10", "abc", "a.js", "var x=1\n")
            .await
            .unwrap();
        assert!(first.created);

        let second = archive
            .save("ex.com", "2026-01-01_10", "abc", "a.js", "something else")
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(first.path, second.path);

        let stored = std::fs::read_to_string(&first.path).unwrap();
        assert_eq!(stored, "var x=1\n");

        let files = std::fs::read_dir(first.path.parent().unwrap()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[tokio::test]
    async fn test_concurrent_saves_publish_complete_file() {
        let tmp = TempDir::new().unwrap();
        let archive = ContentArchive::new(tmp.path(), ContentKind::Js);
        let body = "x".repeat(256 * 1024);

        let (a, b) = tokio::join!(
            archive.save("ex.com", "ts", "h", "big.js", &body),
            archive.save("ex.com", "ts", "h", "big.js", &body),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.path, b.path);
        assert_eq!(std::fs::read_to_string(&a.path).unwrap(), body);
        let names: Vec<_> = std::fs::read_dir(a.path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("big.js")]);
    }

    #[tokio::test]
    async fn test_save_fails_when_base_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("data");
        std::fs::write(&blocker, "not a directory").unwrap();

        let archive = ContentArchive::new(&blocker, ContentKind::Js);
        let err = archive
            .save("ex.com", "ts", "abc", "a.js", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Archive { .. }));
    }

    #[tokio::test]
    async fn test_list_timestamps_sorted() {
        let tmp = TempDir::new().unwrap();
        let archive = ContentArchive::new(tmp.path(), ContentKind::Js);

        for ts in ["2026-01-02_08", "2026-01-01_23", "2026-01-02_07"] {
            archive.save("ex.com", ts, "h", "a.js", "x").await.unwrap();
        }
        std::fs::write(tmp.path().join("ex.com").join("stray.txt"), "").unwrap();

        let timestamps = archive.list_timestamps("ex.com").await.unwrap();
        assert_eq!(
            timestamps,
            vec!["2026-01-01_23", "2026-01-02_07", "2026-01-02_08"]
        );
        assert_eq!(
            archive.list_hashes("ex.com", "2026-01-01_23").await.unwrap(),
            vec!["h"]
        );
        assert!(archive.list_timestamps("other.com").await.unwrap().is_empty());
    }
}
