// src/pipeline/snapshots.rs

//! Archived snapshot buckets of one domain.

use crate::error::{AppError, Result};
use crate::storage::ContentArchive;
use crate::utils::log::Reporter;

/// One timestamp bucket and the content hashes archived in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotBucket {
    pub timestamp: String,
    pub hashes: Vec<String>,
}

/// List the archive buckets of `domain`, oldest first, and print them.
pub async fn run_snapshots(
    archive: &ContentArchive,
    domain: &str,
    reporter: &Reporter,
) -> Result<Vec<SnapshotBucket>> {
    let domain = domain.trim();
    if domain.is_empty() || domain.contains(['/', '\\']) || domain == "." || domain == ".." {
        return Err(AppError::validation(format!("invalid domain: {domain:?}")));
    }

    let mut buckets = Vec::new();
    for timestamp in archive.list_timestamps(domain).await? {
        let hashes = archive.list_hashes(domain, &timestamp).await?;
        buckets.push(SnapshotBucket { timestamp, hashes });
    }

    let lines: Vec<String> = buckets
        .iter()
        .map(|b| format!("{}  {} version(s)  {}", b.timestamp, b.hashes.len(), b.hashes.join(" ")))
        .collect();
    reporter.section(
        &format!("{domain}: {} snapshot(s) in {}", buckets.len(), archive.base_dir().display()),
        &lines,
    );

    Ok(buckets)
}
