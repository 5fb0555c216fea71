//! File system utilities.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Read a newline-delimited URL list.
///
/// Lines are trimmed; blank lines and `#` comments are skipped.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_lines(&content))
}

fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Ensure a directory exists
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Sibling of `path` whose file name is the original name plus `suffix`.
///
/// `hashes.json` becomes `hashes.json.tmp`, so the result never equals `path`.
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Write `bytes` to `tmp`, then rename it to `path`.
///
/// The destination only ever holds complete content. `tmp` is removed when
/// any step fails.
pub async fn write_replace(path: &Path, tmp: &Path, bytes: &[u8]) -> io::Result<()> {
    let result = async {
        let mut file = tokio::fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(tmp, path).await
    }
    .await;

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(tmp).await {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!("Could not remove {}: {}", tmp.display(), e);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_lines_skips_blank_and_comments() {
        let lines = parse_lines("  https://ex.com/a.js  \n\n# disabled\n\thttps://ex.com/b.js\r\n   \n");
        assert_eq!(lines, vec!["https://ex.com/a.js", "https://ex.com/b.js"]);
    }

    #[test]
    fn test_read_lines_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(read_lines(&tmp.path().join("nope.txt")).is_err());
    }

    #[test]
    fn test_read_lines_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("urls.txt");
        fs::write(&path, "https://ex.com/a.js\n\nhttps://ex.com/index.html\n").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "https://ex.com/index.html");
    }

    #[test]
    fn test_sibling_path_appends_suffix() {
        assert_eq!(
            sibling_path(Path::new("data/hashes.json"), ".tmp"),
            PathBuf::from("data/hashes.json.tmp")
        );
        assert_eq!(
            sibling_path(Path::new("state.tmp"), ".tmp"),
            PathBuf::from("state.tmp.tmp")
        );
    }

    #[tokio::test]
    async fn test_write_replace_installs_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.js");
        let staging = sibling_path(&path, ".tmp");

        write_replace(&path, &staging, b"var x=1").await.unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"var x=1");
        assert!(!staging.exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_files_behind() {
        let tmp = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let path = tmp.path().join("a.js");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();
        let staging = sibling_path(&path, ".tmp");

        assert!(write_replace(&path, &staging, b"var x=1").await.is_err());

        assert!(!staging.exists());
        assert!(path.is_dir());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
