//! Secrets Backup Library
//!
//! Backs up every AWS Secrets Manager secret to S3, skipping versions that
//! are already archived under `<name>/<versionId>`.
//!
//! ## Quick Start
//!
//! ```rust
//! use secrets_backup::prelude::*;
//! ```
//!
//! `Reconciler` works against the `SecretStore` and `BackupStore` traits, so
//! any pair of implementations can be reconciled, not only the AWS ones.

pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod observability;
pub mod pagination;
pub mod prelude;
pub mod provider;
pub mod reconciler;
