// src/pipeline/check.rs

//! Change-check pipeline over a list of URLs.

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::Outcome;
use crate::services::Monitor;
use crate::utils::log::Reporter;

/// Counts for one check run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckStats {
    pub total: usize,
    pub new: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl CheckStats {
    fn add(&mut self, result: &Result<Outcome>) {
        match result {
            Ok(Outcome::New { .. }) => self.new += 1,
            Ok(Outcome::Changed { .. }) => self.changed += 1,
            Ok(Outcome::Unchanged { .. }) => self.unchanged += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Check every URL, then persist the store once more.
///
/// URLs run concurrently with at most `max_tasks` checks in flight; network
/// concurrency is bounded separately by the monitor's fetcher. A failed URL
/// is counted and skipped. An empty list is rejected before any request.
pub async fn run_check(
    monitor: &Monitor,
    urls: &[String],
    max_tasks: usize,
    reporter: &Reporter,
) -> Result<CheckStats> {
    if urls.is_empty() {
        return Err(AppError::validation("no URLs to check"));
    }

    let mut stats = CheckStats {
        total: urls.len(),
        ..CheckStats::default()
    };

    if let [url] = urls {
        stats.add(&monitor.check_url(url).await);
    } else {
        let mut results = stream::iter(urls)
            .map(|url| monitor.check_url(url))
            .buffer_unordered(max_tasks.max(1));

        while let Some(result) = results.next().await {
            stats.add(&result);
        }
    }

    if let Err(e) = monitor.store().persist().await {
        reporter.warn(&format!("could not save store: {e}"));
    }

    log::debug!(
        "Checked {} URLs: {} new, {} changed, {} unchanged, {} failed",
        stats.total,
        stats.new,
        stats.changed,
        stats.unchanged,
        stats.failed
    );
    Ok(stats)
}
