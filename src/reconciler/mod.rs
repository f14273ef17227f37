//! # Reconciler
//!
//! Compares the current version of every secret against the objects already
//! in the backup bucket and uploads only what is missing.
//!
//! Each secret goes through `fetched -> listed -> skip | upload -> done`
//! before the next one starts. Ignorable fetch failures are logged and the
//! secret is skipped; every other failure aborts the run.

pub mod types;

use crate::error::BackupError;
use crate::observability::BackupMetrics;
use crate::provider::{BackupStore, SecretStore};
use tracing::{error, info, info_span, warn, Instrument};
use types::{Decision, RunSummary, SecretRecord};

pub struct Reconciler<'a> {
    secrets: &'a dyn SecretStore,
    backups: &'a dyn BackupStore,
    metrics: Option<&'a BackupMetrics>,
}

impl std::fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub fn new(secrets: &'a dyn SecretStore, backups: &'a dyn BackupStore) -> Self {
        Self {
            secrets,
            backups,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: &'a BackupMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Back up one secret version unless it is already archived
    pub async fn reconcile(&self, record: &SecretRecord) -> Result<Decision, BackupError> {
        let key = record.backup_key();
        let existing = self.backups.list_keys(&record.name).await?;

        if existing.contains(&key) {
            info!(
                secret_name = %record.name,
                key = %key,
                operation = "current",
                "Backup is current for {}",
                record.name
            );
            return Ok(Decision::Skipped);
        }

        info!(
            secret_name = %record.name,
            key = %key,
            operation = "upload",
            "Creating key: {}",
            key
        );
        self.backups.upload(&key, &record.payload).await?;
        Ok(Decision::Uploaded)
    }

    /// Run one full pass over every secret in the store
    ///
    /// Stops at the first fatal error. The summary counts secrets that were
    /// uploaded, already current, or skipped after an ignorable fetch
    /// failure.
    pub async fn run(&self) -> Result<RunSummary, BackupError> {
        let names = self
            .secrets
            .list_secret_names()
            .await
            .inspect_err(|e| self.record_error(e))?;

        let mut summary = RunSummary {
            secrets_total: names.len(),
            ..RunSummary::default()
        };
        if let Some(metrics) = self.metrics {
            metrics.record_secrets_found(names.len());
        }

        for name in &names {
            let span = info_span!("backup.secret", secret.name = %name);
            self.process(name, &mut summary)
                .instrument(span)
                .await
                .inspect_err(|e| {
                    error!(
                        secret_name = %name,
                        class = %e.class(),
                        "Aborting backup run: {}",
                        e
                    );
                    self.record_error(e);
                })?;
        }

        info!(
            secrets = summary.secrets_total,
            uploaded = summary.uploaded,
            current = summary.current,
            skipped = summary.skipped,
            "Backup job completed."
        );
        if !summary.skipped_names.is_empty() {
            warn!(
                "Skipped {} secrets that could not be read: {}",
                summary.skipped,
                summary.skipped_names.join(", ")
            );
        }
        Ok(summary)
    }

    async fn process(&self, name: &str, summary: &mut RunSummary) -> Result<(), BackupError> {
        let record = match self.secrets.fetch_current_value(name).await {
            Ok(record) => record,
            Err(e) if !e.is_fatal() => {
                warn!(
                    secret_name = name,
                    class = %e.class(),
                    "Skipping secret {}: {}",
                    name,
                    e
                );
                if let Some(metrics) = self.metrics {
                    metrics.record_skip(&e);
                }
                summary.record_skip(name);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let decision = self.reconcile(&record).await?;
        summary.record(decision, record.payload.len());
        if let Some(metrics) = self.metrics {
            metrics.record_decision(decision, record.payload.len());
        }
        Ok(())
    }

    fn record_error(&self, error: &BackupError) {
        if let Some(metrics) = self.metrics {
            metrics.record_error(error);
        }
    }
}
