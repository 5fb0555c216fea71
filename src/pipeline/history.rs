// src/pipeline/history.rs

//! Stored version history of one resource.

use crate::error::Result;
use crate::models::ResourceHistory;
use crate::storage::VersionStore;
use crate::utils::log::Reporter;
use crate::utils::url;

/// Print the history recorded for `raw_url` and return it.
///
/// Query and fragment are ignored, the same as during a check. A URL the
/// store has never seen prints a notice and returns `None`.
pub async fn run_history(
    store: &VersionStore,
    raw_url: &str,
    reporter: &Reporter,
) -> Result<Option<ResourceHistory>> {
    let id = url::canonical_id(&url::parse(raw_url)?);

    let Some(history) = store.history(&id).await else {
        reporter.section(&format!("No history for {id}"), &[]);
        return Ok(None);
    };

    let lines: Vec<String> = history
        .history
        .iter()
        .map(|record| {
            let marker = if record.hash == history.latest_hash { "*" } else { " " };
            format!(
                "{marker} {}  {}  {}",
                record.timestamp,
                record.hash,
                record.path.display()
            )
        })
        .collect();

    reporter.section(
        &format!("{id} ({} versions)", history.history.len()),
        &lines,
    );
    Ok(Some(history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_history_uses_canonical_identity() {
        let store = VersionStore::new();
        store
            .update("https://ex.com/a.js", "h1", "data/ex.com/t1/h1/a.js", "t1")
            .await;
        store
            .update("https://ex.com/a.js", "h2", "data/ex.com/t2/h2/a.js", "t2")
            .await;

        let history = run_history(&store, "https://ex.com/a.js?v=9", &Reporter::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(history.latest_hash, "h2");
        assert_eq!(history.history.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_url_has_no_history() {
        let store = VersionStore::new();
        let history = run_history(&store, "https://ex.com/b.js", &Reporter::default())
            .await
            .unwrap();
        assert!(history.is_none());
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_error() {
        let store = VersionStore::new();
        let err = run_history(&store, "no scheme here", &Reporter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Url(_)));
    }
}
