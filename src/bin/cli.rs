//! radarlance CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use radarlance::{
    error::{AppError, Result},
    models::{Config, ContentKind},
    pipeline,
    services::Monitor,
    storage::{ContentArchive, VersionStore},
    utils::{
        fs,
        log::{Reporter, Verbosity},
    },
};

/// radarlance - JS/HTML change monitor
#[derive(Parser, Debug)]
#[command(
    name = "radarlance",
    version,
    about = "Watches remote JS/HTML resources and archives every distinct version"
)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long, global = true, default_value = "radarlance.toml")]
    config: PathBuf,

    /// Directory holding the archive and the store file [default: data]
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print per-step progress and unchanged resources
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print classifications and problems
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch URLs and archive every changed version
    Check {
        /// File with one URL per line
        #[arg(short, long, required_unless_present = "url")]
        input: Option<PathBuf>,

        /// Single URL to check; takes precedence over --input
        #[arg(short, long)]
        url: Option<String>,

        /// Store file, relative to the data directory [default: hashes.json]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum concurrent requests, at least 1 [default: 10]
        #[arg(short, long)]
        threads: Option<usize>,

        /// Content type of the monitored resources (js or html)
        #[arg(long = "type", value_parser = ["js", "html"])]
        content_type: Option<String>,
    },

    /// Show the stored versions of a URL
    History {
        /// URL whose history to show
        url: String,
    },

    /// List archived snapshot buckets of a domain
    Snapshots {
        /// Host name as used in the archive
        domain: String,
    },
}

/// Initialize logging based on verbosity flags and configured level.
fn init_logging(verbosity: Verbosity, configured: &str) {
    let level = match verbosity {
        Verbosity::Verbose => "debug",
        Verbosity::Quiet => "warn",
        Verbosity::Normal => configured,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let reporter = Reporter::new(Verbosity::from_flags(cli.verbose, cli.quiet));

    let mut config = Config::load_optional(&cli.config)?;
    init_logging(reporter.verbosity(), &config.logging.level);

    if let Some(dir) = &cli.data_dir {
        config.paths.data_dir = dir.to_string_lossy().into_owned();
    }

    match cli.command {
        Command::Check {
            input,
            url,
            output,
            threads,
            content_type,
        } => {
            if let Some(output) = output {
                config.paths.store_file = output.to_string_lossy().into_owned();
            }
            if let Some(threads) = threads {
                config.monitor.threads = threads;
            }
            if let Some(content_type) = content_type {
                config.monitor.content_type = ContentKind::parse(&content_type);
            }
            config
                .validate()
                .map_err(|e| AppError::config(e.to_string()))?;

            let urls = match (url, input) {
                (Some(url), _) => vec![url],
                (None, Some(input)) => fs::read_lines(&input).map_err(|e| {
                    AppError::config(format!("cannot read {}: {}", input.display(), e))
                })?,
                (None, None) => return Err(AppError::config("either --input or --url is required")),
            };
            if urls.is_empty() {
                return Err(AppError::config("no URLs to check"));
            }

            let data_dir = config.data_dir();
            fs::ensure_dir(&data_dir).map_err(|e| {
                AppError::config(format!("cannot create {}: {}", data_dir.display(), e))
            })?;

            let store_path = config.store_path();
            let store = VersionStore::load(&store_path).await.map_err(|e| {
                AppError::config(format!("cannot read {}: {}", store_path.display(), e))
            })?;
            log::info!(
                "Loaded {} tracked resources from {}",
                store.len().await,
                store_path.display()
            );

            let monitor = Monitor::from_config(&config, Arc::new(store), reporter)?;

            let started = Instant::now();
            let stats =
                pipeline::run_check(&monitor, &urls, config.monitor.max_tasks, &reporter).await?;

            reporter.summary(
                "Summary",
                &[
                    ("checked", stats.total.to_string()),
                    ("new", stats.new.to_string()),
                    ("changed", stats.changed.to_string()),
                    ("unchanged", stats.unchanged.to_string()),
                    ("failed", stats.failed.to_string()),
                ],
            );
            reporter.completed(started.elapsed());
        }

        Command::History { url } => {
            let store_path = config.store_path();
            let store = VersionStore::load(&store_path).await.map_err(|e| {
                AppError::config(format!("cannot read {}: {}", store_path.display(), e))
            })?;
            pipeline::run_history(&store, &url, &reporter).await?;
        }

        Command::Snapshots { domain } => {
            let archive = ContentArchive::new(config.data_dir(), config.monitor.content_type);
            pipeline::run_snapshots(&archive, &domain, &reporter).await?;
        }
    }

    Ok(())
}
