//! # Backup Configuration
//!
//! Validated settings for one run, built from the parsed command line.

use crate::cli::Cli;
use crate::constants::{MIB, MIN_PART_SIZE_MIB};
use crate::error::BackupError;
use crate::provider::aws::S3Settings;
use std::path::PathBuf;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Settings for one backup run
///
/// Logging is configured from [`Cli`] before this is built so that
/// validation errors are logged.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// `None` lets the SDK region chain decide
    pub region: Option<String>,
    pub s3: S3Settings,
    pub metrics_file: Option<PathBuf>,
}

impl BackupConfig {
    /// Validate the command line
    ///
    /// Rejects an empty bucket and a part size S3 would refuse.
    pub fn from_cli(cli: Cli) -> Result<Self, BackupError> {
        let bucket = cli.bucket.trim().to_string();
        if bucket.is_empty() {
            return Err(BackupError::Config(
                "bucket is required (--bucket or AWS_S3_BUCKET)".to_string(),
            ));
        }

        if cli.part_size_mib < MIN_PART_SIZE_MIB {
            return Err(BackupError::Config(format!(
                "part size must be at least {MIN_PART_SIZE_MIB} MiB, got {}",
                cli.part_size_mib
            )));
        }
        let part_size_bytes = cli.part_size_mib.checked_mul(MIB).ok_or_else(|| {
            BackupError::Config(format!("part size {} MiB is too large", cli.part_size_mib))
        })?;

        let region = cli
            .region
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let endpoint_url = cli
            .s3_endpoint_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        Ok(Self {
            region,
            s3: S3Settings {
                bucket,
                part_size_bytes,
                endpoint_url,
                force_path_style: cli.force_path_style,
            },
            metrics_file: cli.metrics_file,
        })
    }
}
