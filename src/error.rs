//! # Errors
//!
//! Typed errors for the backup job.
//!
//! Every error carries an [`ErrorClass`] that is decided where the error is
//! created (at the SDK boundary), so the run loop never inspects error codes
//! or message strings.

use thiserror::Error;

/// How the run loop treats a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Abort the run
    Fatal,
    /// Transient (throttling, timeouts, network). There are no retries, so
    /// the run aborts the same way it does for `Fatal`.
    Retryable,
    /// Concerns a single secret only: log it and move on
    Ignorable,
}

impl ErrorClass {
    /// Get human-readable string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Fatal => "fatal",
            ErrorClass::Retryable => "retryable",
            ErrorClass::Ignorable => "ignorable",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("No secrets found. Verify account and permissions.")]
    NoSecrets,

    #[error("failed to list secrets: {message}")]
    ListSecrets { class: ErrorClass, message: String },

    #[error("error fetching secret {name}: {message}")]
    FetchSecret {
        name: String,
        class: ErrorClass,
        message: String,
    },

    #[error("secret {name} has no string or binary value")]
    EmptyValue { name: String },

    #[error("secret {name} has no version id for stage AWSCURRENT")]
    MissingVersion { name: String },

    #[error("failed to list objects for bucket {bucket} with prefix {prefix}: {message}")]
    ListObjects {
        bucket: String,
        prefix: String,
        class: ErrorClass,
        message: String,
    },

    #[error("unable to upload {key:?} to {bucket:?}: {message}")]
    Upload {
        bucket: String,
        key: String,
        class: ErrorClass,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BackupError {
    /// Classification attached when the error was created
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            BackupError::FetchSecret { class, .. }
            | BackupError::ListSecrets { class, .. }
            | BackupError::ListObjects { class, .. }
            | BackupError::Upload { class, .. } => *class,
            BackupError::EmptyValue { .. } | BackupError::MissingVersion { .. } => {
                ErrorClass::Ignorable
            }
            BackupError::NoSecrets | BackupError::Config(_) => ErrorClass::Fatal,
        }
    }

    /// Whether the run must stop. Only ignorable errors let it continue.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.class() != ErrorClass::Ignorable
    }

    /// Secret name this error concerns, if any
    #[must_use]
    pub fn secret_name(&self) -> Option<&str> {
        match self {
            BackupError::FetchSecret { name, .. }
            | BackupError::EmptyValue { name }
            | BackupError::MissingVersion { name } => Some(name),
            BackupError::ListObjects { prefix, .. } => Some(prefix),
            _ => None,
        }
    }
}
