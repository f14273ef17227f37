//! # Provider Modules
//!
//! Seams between the reconciler and the cloud services it talks to.
//!
//! - `SecretStore` enumerates secrets and reads their current version
//! - `BackupStore` lists archived objects and uploads new ones

use crate::error::BackupError;
use crate::reconciler::types::{BackupKey, ExistingObjectSet, SecretRecord};
use async_trait::async_trait;

/// Source of secrets to back up
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Names of every secret, in the store's listing order
    ///
    /// Pages through the full listing. An empty result is
    /// `BackupError::NoSecrets`.
    async fn list_secret_names(&self) -> Result<Vec<String>, BackupError>;

    /// Current (`AWSCURRENT`) version of a secret
    async fn fetch_current_value(&self, name: &str) -> Result<SecretRecord, BackupError>;
}

/// Destination for archived secret versions
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Every object key under `prefix`, across all listing pages
    async fn list_keys(&self, prefix: &str) -> Result<ExistingObjectSet, BackupError>;

    /// Write `payload` at `key`, as a multipart upload when it exceeds one part
    async fn upload(&self, key: &BackupKey, payload: &[u8]) -> Result<(), BackupError>;
}

pub mod aws;
