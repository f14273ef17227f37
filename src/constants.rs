//! # Constants
//!
//! Shared constants used throughout the backup job.
//!
//! These values represent reasonable defaults and can be overridden via
//! command-line flags or environment variables where applicable.

/// Version stage AWS Secrets Manager attaches to the active version of a secret
pub const CURRENT_VERSION_STAGE: &str = "AWSCURRENT";

/// Separator between secret name and version id in a backup object key
pub const BACKUP_KEY_SEPARATOR: &str = "/";

/// Default multipart upload part size (MiB)
pub const DEFAULT_PART_SIZE_MIB: u64 = 64;

/// Smallest part size S3 accepts for every part except the last (MiB)
pub const MIN_PART_SIZE_MIB: u64 = 5;

/// Largest number of parts S3 accepts in one multipart upload
pub const MAX_UPLOAD_PARTS: usize = 10_000;

/// Bytes per MiB
pub const MIB: u64 = 1024 * 1024;

/// Default tracing filter directive when neither `RUST_LOG` nor `--log-level` is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable holding the AWS region
pub const REGION_ENV: &str = "AWS_REGION";

/// Environment variable holding the destination bucket
pub const BUCKET_ENV: &str = "AWS_S3_BUCKET";
