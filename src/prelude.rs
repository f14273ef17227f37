//! # Prelude
//!
//! Re-exports commonly used types and traits.
//!
//! ```rust
//! use secrets_backup::prelude::*;
//! ```

// Provider traits - needed for implementing stores
pub use crate::provider::{BackupStore, SecretStore};

// Reconciler types - core backup functionality
pub use crate::reconciler::types::{
    BackupKey, Decision, ExistingObjectSet, RunSummary, SecretRecord,
};
pub use crate::reconciler::Reconciler;

// Config and context
pub use crate::config::{BackupConfig, LogFormat};
pub use crate::context::BackupContext;

// Common error types
pub use crate::error::{BackupError, ErrorClass};
