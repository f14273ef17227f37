//! # Command Line
//!
//! Flags for the backup job. Every flag can also be set through an
//! environment variable so the job runs unchanged from cron, a CronJob
//! manifest or a CI schedule.
//!
//! ## Usage
//!
//! ```bash
//! # Back up every secret in eu-west-1
//! secrets-backup --region eu-west-1 --bucket my-secret-backups
//!
//! # Same, configured through the environment
//! AWS_REGION=eu-west-1 AWS_S3_BUCKET=my-secret-backups secrets-backup
//!
//! # MinIO destination, JSON logs, textfile metrics
//! secrets-backup --bucket backups --s3-endpoint-url http://minio:9000 \
//!     --log-format json --metrics-file /var/lib/node_exporter/secrets_backup.prom
//! ```

use crate::config::LogFormat;
use crate::constants::{BUCKET_ENV, DEFAULT_LOG_LEVEL, DEFAULT_PART_SIZE_MIB, REGION_ENV};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Back up AWS Secrets Manager secrets to S3
#[derive(Debug, Clone, Parser)]
#[command(name = "secrets-backup", version, long_about = None)]
#[command(
    about = "Back up every AWS Secrets Manager secret to S3, uploading only versions not archived yet",
    after_help = "\
Objects are written as <secret-name>/<version-id>. A secret whose current
version already exists under that key is left alone.

Exit status is 0 when the pass completes (secrets that could not be read are
logged and skipped) and 1 when the run aborts."
)]
pub struct Cli {
    /// AWS region for all calls (defaults to the SDK region chain)
    #[arg(long, env = REGION_ENV)]
    pub region: Option<String>,

    /// Destination S3 bucket
    #[arg(long, env = BUCKET_ENV)]
    pub bucket: String,

    /// Multipart upload part size in MiB (minimum 5)
    #[arg(long, env = "BACKUP_PART_SIZE_MIB", default_value_t = DEFAULT_PART_SIZE_MIB)]
    pub part_size_mib: u64,

    /// Custom S3-compatible endpoint URL
    #[arg(long, env = "BACKUP_S3_ENDPOINT_URL")]
    pub s3_endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[arg(
        long,
        env = "BACKUP_S3_FORCE_PATH_STYLE",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub force_path_style: bool,

    /// Log filter directive, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Write run metrics to this file (Prometheus textfile format)
    #[arg(long, env = "BACKUP_METRICS_FILE")]
    pub metrics_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Clears the variables read by [`Cli`] on creation and on drop
    struct EnvGuard;

    impl EnvGuard {
        fn new() -> Self {
            Self::clear();
            Self
        }

        fn clear() {
            env::remove_var(REGION_ENV);
            env::remove_var(BUCKET_ENV);
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            Self::clear();
        }
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "secrets-backup",
            "--region",
            "us-east-1",
            "--bucket",
            "my-backups",
            "--part-size-mib",
            "16",
            "--force-path-style",
            "false",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.region.as_deref(), Some("us-east-1"));
        assert_eq!(cli.bucket, "my-backups");
        assert_eq!(cli.part_size_mib, 16);
        assert!(!cli.force_path_style);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    #[serial]
    fn test_defaults() {
        let _guard = EnvGuard::new();
        let cli = Cli::try_parse_from(["secrets-backup", "--bucket", "b"]).unwrap();
        assert_eq!(cli.part_size_mib, DEFAULT_PART_SIZE_MIB);
        assert!(cli.force_path_style);
        assert!(cli.s3_endpoint_url.is_none());
        assert!(cli.metrics_file.is_none());
        assert!(cli.region.is_none());
    }

    #[test]
    #[serial]
    fn test_bucket_and_region_from_environment() {
        let _guard = EnvGuard::new();
        env::set_var(BUCKET_ENV, "env-backups");
        env::set_var(REGION_ENV, "ap-southeast-2");

        let cli = Cli::try_parse_from(["secrets-backup"]).unwrap();

        assert_eq!(cli.bucket, "env-backups");
        assert_eq!(cli.region.as_deref(), Some("ap-southeast-2"));
    }

    #[test]
    #[serial]
    fn test_flag_overrides_environment() {
        let _guard = EnvGuard::new();
        env::set_var(BUCKET_ENV, "env-backups");

        let cli = Cli::try_parse_from(["secrets-backup", "--bucket", "flag-backups"]).unwrap();

        assert_eq!(cli.bucket, "flag-backups");
    }

    #[test]
    #[serial]
    fn test_missing_bucket_rejected() {
        let _guard = EnvGuard::new();
        assert!(Cli::try_parse_from(["secrets-backup"]).is_err());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let result =
            Cli::try_parse_from(["secrets-backup", "--bucket", "b", "--log-format", "xml"]);
        assert!(result.is_err());
    }
}
