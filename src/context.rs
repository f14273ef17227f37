//! # Backup Context
//!
//! Everything one run needs, constructed once at startup and passed by
//! reference: validated config, the secret source, the backup destination
//! and the run's metrics registry.

use crate::config::BackupConfig;
use crate::error::BackupError;
use crate::observability::BackupMetrics;
use crate::provider::aws::{create_sdk_config, AwsSecretStore, S3BackupStore};
use crate::reconciler::types::RunSummary;
use crate::reconciler::Reconciler;
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug)]
pub struct BackupContext {
    pub config: BackupConfig,
    pub secrets: AwsSecretStore,
    pub backups: S3BackupStore,
    pub metrics: BackupMetrics,
}

impl BackupContext {
    /// Build the AWS clients from one shared SDK config
    pub async fn from_config(config: BackupConfig) -> Result<Self> {
        let sdk_config = create_sdk_config(config.region.as_deref()).await;
        let secrets = AwsSecretStore::new(&sdk_config);
        let backups = S3BackupStore::new(&sdk_config, &config.s3);
        let metrics = BackupMetrics::new().context("Failed to register metrics")?;

        info!(
            bucket = %config.s3.bucket,
            part_size_bytes = config.s3.part_size_bytes,
            "Backing up secrets to s3://{}",
            config.s3.bucket
        );

        Ok(Self {
            config,
            secrets,
            backups,
            metrics,
        })
    }

    #[must_use]
    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(&self.secrets, &self.backups).with_metrics(&self.metrics)
    }

    /// Run one pass and publish the run metrics
    ///
    /// The metrics file is written whether the run completed or aborted; a
    /// failure to write it is logged and does not change the outcome.
    pub async fn run(&self) -> Result<RunSummary, BackupError> {
        let start = Instant::now();
        let result = self.reconciler().run().await;
        self.metrics.finish_run(start.elapsed(), result.is_ok());

        if let Some(path) = &self.config.metrics_file {
            match self.metrics.write_textfile(path) {
                Ok(()) => info!("Wrote run metrics to {}", path.display()),
                Err(e) => warn!("Failed to write run metrics: {:#}", e),
            }
        }

        result
    }
}
