//! # AWS Providers
//!
//! - `secrets_manager`: AWS Secrets Manager as the secret source
//! - `s3`: S3 (or S3-compatible storage) as the backup destination
//! - `auth`: shared SDK configuration from the default credential chain
//! - `errors`: SDK error classification

pub mod auth;
pub mod errors;
pub mod s3;
pub mod secrets_manager;

pub use auth::create_sdk_config;
pub use s3::{S3BackupStore, S3Settings};
pub use secrets_manager::AwsSecretStore;
