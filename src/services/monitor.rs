// src/services/monitor.rs

//! Per-URL change-detection pipeline.
//!
//! fetch → raw hash check → normalize → hash → classify → archive → record
//!
//! The raw-body digest is compared against the stored latest hash first so an
//! unchanged resource is never normalized. Stored hashes are digests of the
//! normalized form, so the fast path only hits when the normalizer leaves a
//! body as it is; otherwise the second comparison catches it.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Config, ContentKind, Outcome, UnchangedReason, VersionRecord};
use crate::services::fetcher::{Fetch, HttpFetcher};
use crate::services::hasher::Hasher;
use crate::services::normalizer::{Beautifier, Normalizer, Passthrough};
use crate::storage::{ContentArchive, Recorded, VersionStore};
use crate::utils::log::Reporter;
use crate::utils::{self, url};

/// Wires fetcher, normalizer, hasher, archive and store together.
pub struct Monitor {
    fetcher: Arc<dyn Fetch>,
    normalizer: Arc<dyn Normalizer>,
    hasher: Hasher,
    store: Arc<VersionStore>,
    archive: ContentArchive,
    reporter: Reporter,
}

impl Monitor {
    /// Create a monitor with the default beautifier and digest.
    pub fn new(fetcher: Arc<dyn Fetch>, store: Arc<VersionStore>, archive: ContentArchive) -> Self {
        Self {
            fetcher,
            normalizer: Arc::new(Beautifier),
            hasher: Hasher::default(),
            store,
            archive,
            reporter: Reporter::default(),
        }
    }

    /// Build a monitor with an HTTP fetcher from configuration.
    pub fn from_config(config: &Config, store: Arc<VersionStore>, reporter: Reporter) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.monitor)?;
        let archive = ContentArchive::new(config.data_dir(), config.monitor.content_type);
        let normalizer: Arc<dyn Normalizer> = if config.monitor.normalize {
            Arc::new(Beautifier)
        } else {
            Arc::new(Passthrough)
        };

        Ok(Self::new(Arc::new(fetcher), store, archive)
            .with_normalizer(normalizer)
            .with_hasher(Hasher::new(config.monitor.hash_algorithm))
            .with_reporter(reporter))
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn store(&self) -> &Arc<VersionStore> {
        &self.store
    }

    pub fn kind(&self) -> ContentKind {
        self.archive.kind()
    }

    /// Check one URL against the current hour bucket.
    pub async fn check_url(&self, raw_url: &str) -> Result<Outcome> {
        self.check_url_at(raw_url, &utils::timestamp()).await
    }

    /// Check one URL, archiving new versions under `timestamp`.
    ///
    /// Failures are reported before being returned. The store is only
    /// touched after the archive write succeeded.
    pub async fn check_url_at(&self, raw_url: &str, timestamp: &str) -> Result<Outcome> {
        match self.run(raw_url, timestamp).await {
            Ok((canonical, outcome)) => {
                self.reporter.outcome(&canonical, &outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.report_failure(raw_url, &e);
                Err(e)
            }
        }
    }

    async fn run(&self, raw_url: &str, timestamp: &str) -> Result<(String, Outcome)> {
        self.reporter.step(&format!("checking {raw_url}"));

        let parsed = url::parse(raw_url)?;
        let canonical = url::canonical_id(&parsed);

        let content = self.fetcher.fetch(parsed.as_str()).await?;
        if content.is_empty() {
            return Err(AppError::EmptyResponse {
                url: raw_url.to_string(),
            });
        }

        let raw_hash = self.hasher.hash(&content);
        let latest = self.store.latest_hash(&canonical).await;
        if latest.as_deref() == Some(raw_hash.as_str()) {
            return Ok((
                canonical,
                Outcome::Unchanged {
                    reason: UnchangedReason::RawHashMatch,
                },
            ));
        }

        let stored = self.normalize(raw_url, content);
        let stored_hash = self.hasher.hash(&stored);
        if latest.as_deref() == Some(stored_hash.as_str()) {
            log::debug!("{canonical}: normalized content matches hash {stored_hash}");
            return Ok((
                canonical,
                Outcome::Unchanged {
                    reason: UnchangedReason::StoredHashMatch,
                },
            ));
        }

        let archived = self
            .archive
            .save(
                &url::domain(&parsed),
                timestamp,
                &stored_hash,
                url::resource_path(&parsed),
                &stored,
            )
            .await?;
        if archived.created {
            self.reporter.saved(raw_url, &archived.path);
        } else {
            self.reporter.step(&format!(
                "version already saved for {raw_url} (hash {stored_hash})"
            ));
        }

        let record = VersionRecord {
            hash: stored_hash,
            path: archived.path.clone(),
            timestamp: timestamp.to_string(),
        };
        let outcome = match self.store.record(&canonical, record).await {
            Recorded::New => Outcome::New {
                path: archived.path,
            },
            Recorded::Changed { previous } => Outcome::Changed {
                old_path: previous,
                new_path: archived.path,
            },
            Recorded::Unchanged => Outcome::Unchanged {
                reason: UnchangedReason::StoredHashMatch,
            },
        };

        if outcome.is_mutation() {
            if let Err(e) = self.store.persist().await {
                self.reporter.warn(&format!("failed to save store: {e}"));
            }
        }

        Ok((canonical, outcome))
    }

    /// Beautify `content`, falling back to the raw bytes on failure.
    ///
    /// Bodies that are not valid UTF-8 are never decoded; they are stored
    /// byte for byte.
    fn normalize(&self, raw_url: &str, content: Vec<u8>) -> Vec<u8> {
        let text = match String::from_utf8(content) {
            Ok(text) => text,
            Err(e) => {
                self.reporter
                    .step(&format!("{raw_url} is not valid UTF-8, saving raw"));
                return e.into_bytes();
            }
        };

        match self.normalizer.beautify(&text, self.kind()) {
            Ok(formatted) if !formatted.trim().is_empty() => formatted.into_bytes(),
            Ok(_) => text.into_bytes(),
            Err(e) => {
                self.reporter
                    .step(&format!("beautify failed for {raw_url}: {e}, saving raw"));
                log::debug!("Normalization failed for {raw_url}: {e}");
                text.into_bytes()
            }
        }
    }

    fn report_failure(&self, raw_url: &str, error: &AppError) {
        match error {
            AppError::Url(e) => self.reporter.warn(&format!("invalid URL: {raw_url} ({e})")),
            AppError::EmptyResponse { .. } => {
                self.reporter.warn(&format!("empty response for {raw_url}"))
            }
            AppError::Archive { .. } => self
                .reporter
                .warn(&format!("failed to save content for {raw_url}: {error}")),
            _ => self
                .reporter
                .error(&format!("error fetching {raw_url}: {error}")),
        }
    }
}
