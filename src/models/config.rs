//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{ContentKind, HashAlgorithm};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fetching and change-detection behavior
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Data directory and store file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Diagnostic log settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration if the file exists, defaults otherwise.
    ///
    /// A missing file is the normal case and is only logged at debug level;
    /// a file that exists but does not parse is an error.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path).map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.user_agent.trim().is_empty() {
            return Err(AppError::validation("monitor.user_agent is empty"));
        }
        if self.monitor.timeout_secs == 0 {
            return Err(AppError::validation("monitor.timeout_secs must be > 0"));
        }
        if self.monitor.max_tasks == 0 {
            return Err(AppError::validation("monitor.max_tasks must be > 0"));
        }
        if self.paths.data_dir.trim().is_empty() {
            return Err(AppError::validation("paths.data_dir is empty"));
        }
        Ok(())
    }

    /// Location of the version store document.
    ///
    /// Relative store files live inside the data directory.
    pub fn store_path(&self) -> PathBuf {
        let file = if self.paths.store_file.trim().is_empty() {
            defaults::store_file()
        } else {
            self.paths.store_file.clone()
        };
        let file = PathBuf::from(file);
        if file.is_absolute() {
            file
        } else {
            self.data_dir().join(file)
        }
    }

    /// Base directory of the content archive.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.data_dir)
    }
}

/// Fetching and change-detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Maximum concurrent HTTP requests
    #[serde(default = "defaults::threads")]
    pub threads: usize,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Kind of resource being watched
    #[serde(default)]
    pub content_type: ContentKind,

    /// Digest used for dedup and archive addressing
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    /// Beautify content before storing it
    #[serde(default = "defaults::normalize")]
    pub normalize: bool,

    /// Upper bound on per-URL tasks in flight
    #[serde(default = "defaults::max_tasks")]
    pub max_tasks: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threads: defaults::threads(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
            content_type: ContentKind::default(),
            hash_algorithm: HashAlgorithm::default(),
            normalize: defaults::normalize(),
            max_tasks: defaults::max_tasks(),
        }
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory for archived files and the store
    #[serde(default = "defaults::data_dir")]
    pub data_dir: String,

    /// Store file name, relative to `data_dir` unless absolute
    #[serde(default = "defaults::store_file")]
    pub store_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
            store_file: defaults::store_file(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter for diagnostic logs (`RUST_LOG` wins)
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn threads() -> usize {
        10
    }
    pub fn timeout() -> u64 {
        20
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; radarlance/0.1)".into()
    }
    pub fn normalize() -> bool {
        true
    }
    pub fn max_tasks() -> usize {
        256
    }
    pub fn data_dir() -> String {
        "data".into()
    }
    pub fn store_file() -> String {
        "hashes.json".into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
