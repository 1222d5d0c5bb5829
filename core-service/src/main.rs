//! `lr2immich`: mirror Lightroom Classic collections into Immich albums.
//!
//! Connection details come from the environment (`IMMICH_API_URL`,
//! `IMMICH_API_KEY`, `LIGHTROOM_CATALOG`, ...); flags override them.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use bridge_traits::time::LogLevel;
use clap::Parser;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::{SyncSettings, SyncSettingsBuilder};
use core_service::{bootstrap, CoreError};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "lr2immich", version, about = "Mirror Lightroom collections into Immich albums")]
struct Cli {
    /// Path to the Lightroom catalog (.lrcat)
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Report what would change without writing to Immich
    #[arg(long)]
    dry_run: bool,

    /// Only sync collections whose album name contains NAME (case-insensitive)
    #[arg(long, value_name = "NAME")]
    collection: Option<String>,

    /// Continue without the identity cache when it cannot be reached
    #[arg(short, long)]
    force: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Log output format: pretty, compact or json
    #[arg(long, value_name = "FORMAT", default_value = "compact")]
    log_format: LogFormat,

    /// Max asset ids per album update request
    #[arg(long, value_name = "N")]
    batch_size: Option<usize>,

    /// Identity cache database location
    #[arg(long, value_name = "PATH")]
    cache_path: Option<PathBuf>,

    /// Identity cache entry lifetime in seconds (0 = no expiry)
    #[arg(long, value_name = "SECS")]
    cache_ttl: Option<u64>,
}

impl Cli {
    fn logging_config(&self) -> LoggingConfig {
        let level = if self.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };
        LoggingConfig::default()
            .with_format(self.log_format)
            .with_level(level)
    }

    /// Environment first, flags on top.
    fn settings(&self) -> core_runtime::Result<SyncSettings> {
        let mut builder = SyncSettingsBuilder::from_env()
            .dry_run(self.dry_run)
            .allow_missing_cache(self.force);

        if let Some(path) = &self.catalog {
            builder = builder.catalog_path(path.clone());
        }
        if let Some(filter) = &self.collection {
            builder = builder.collection_filter(filter.clone());
        }
        if let Some(size) = self.batch_size {
            builder = builder.batch_size(size);
        }
        if let Some(path) = &self.cache_path {
            builder = builder.cache_path(path.clone());
        }
        if let Some(secs) = self.cache_ttl {
            builder = builder.cache_ttl_secs(secs);
        }

        builder.build()
    }
}

async fn run(settings: SyncSettings) -> Result<(), CoreError> {
    let core = bootstrap(&settings).await?;
    let summary = core.run().await?;

    for report in &summary.reports {
        info!(
            album = %report.name,
            media = report.media_count,
            resolved = report.resolved,
            not_found = report.not_found,
            outcome = %report.outcome,
            "Collection done"
        );
    }
    for failure in &summary.failures {
        warn!(album = %failure.name, error = %failure.message, "Collection failed");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.logging_config()) {
        eprintln!("lr2immich: {e}");
        return ExitCode::FAILURE;
    }

    let settings = match cli.settings().context("invalid configuration") {
        Ok(settings) => settings,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    info!(settings = ?settings, "Starting sync");

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Sync aborted");
            ExitCode::FAILURE
        }
    }
}
