//! # Secrets Backup
//!
//! One-shot backup of every AWS Secrets Manager secret to S3.
//!
//! ## Overview
//!
//! 1. **Enumerate** - Lists every secret in the account and region
//! 2. **Fetch** - Reads the `AWSCURRENT` version of each secret
//! 3. **Compare** - Lists existing objects under the secret's name in the bucket
//! 4. **Upload** - Writes `<name>/<versionId>` when that key is missing
//!
//! The process runs once and exits. Schedule it with cron, a Kubernetes
//! CronJob or a CI pipeline.
//!
//! ## Exit codes
//!
//! - `0` - the pass completed (unreadable secrets are logged and skipped)
//! - `1` - the run aborted (no secrets, listing or upload failure, bad configuration)

use clap::Parser;
use secrets_backup::cli::Cli;
use secrets_backup::config::BackupConfig;
use secrets_backup::context::BackupContext;
use secrets_backup::observability::logging;
use std::process::ExitCode;
use tracing::{error, info};

// One secret at a time on a single thread
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Configure rustls crypto provider FIRST, before any other operations
    // Required for rustls 0.23+ when no default provider is set via features
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider was already installed");
    }

    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format);

    info!("Starting secrets backup v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    let config = match BackupConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let context = match BackupContext::from_config(config).await {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to initialize backup: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match context.run().await {
        Ok(summary) => {
            info!(
                "Backup finished: {} uploaded, {} current, {} skipped of {} secrets",
                summary.uploaded, summary.current, summary.skipped, summary.secrets_total
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(class = %e.class(), "Backup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
