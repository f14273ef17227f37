//! # Types
//!
//! Core types for the reconciler.

use crate::constants::BACKUP_KEY_SEPARATOR;
use std::collections::HashSet;
use std::fmt;

/// Current version of one secret, held for a single reconciliation step
#[derive(Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub name: String,
    pub version_id: String,
    pub payload: Vec<u8>,
}

// Never print the payload
impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRecord")
            .field("name", &self.name)
            .field("version_id", &self.version_id)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl SecretRecord {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version_id: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            version_id: version_id.into(),
            payload: payload.into(),
        }
    }

    /// Object key this version is archived under
    #[must_use]
    pub fn backup_key(&self) -> BackupKey {
        BackupKey::derive(&self.name, &self.version_id)
    }
}

/// Object key of an archived secret version: `<name>/<versionId>`
///
/// Existing backups are detected by exact key match, so this format must not
/// change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackupKey(String);

impl BackupKey {
    #[must_use]
    pub fn derive(name: &str, version_id: &str) -> Self {
        Self([name, version_id].join(BACKUP_KEY_SEPARATOR))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BackupKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Keys already present in the bucket under one secret's prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingObjectSet(HashSet<String>);

impl ExistingObjectSet {
    #[must_use]
    pub fn contains(&self, key: &BackupKey) -> bool {
        self.0.contains(key.as_str())
    }
}

impl FromIterator<String> for ExistingObjectSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of reconciling one secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The current version was already archived
    Skipped,
    /// The current version was uploaded
    Uploaded,
}

impl Decision {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Skipped => "current",
            Decision::Uploaded => "uploaded",
        }
    }
}

/// Counters for one full pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub secrets_total: usize,
    pub uploaded: usize,
    pub current: usize,
    /// Secrets passed over because of an ignorable fetch failure
    pub skipped: usize,
    pub skipped_names: Vec<String>,
    pub bytes_uploaded: u64,
}

impl RunSummary {
    pub fn record(&mut self, decision: Decision, payload_len: usize) {
        match decision {
            Decision::Skipped => self.current += 1,
            Decision::Uploaded => {
                self.uploaded += 1;
                self.bytes_uploaded += payload_len as u64;
            }
        }
    }

    pub fn record_skip(&mut self, name: &str) {
        self.skipped += 1;
        self.skipped_names.push(name.to_string());
    }
}
