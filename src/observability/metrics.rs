//! # Metrics
//!
//! Prometheus metrics for one backup run.
//!
//! The job exits after a single pass, so nothing scrapes it. Instead the
//! registry can be written to a file for the node-exporter textfile
//! collector, giving alerting a last-success timestamp to watch.
//!
//! ## Metrics Exposed
//!
//! - `secrets_backup_secrets_total` - Secrets returned by the enumeration
//! - `secrets_backup_outcomes_total{outcome}` - `uploaded`, `current` or `skipped`
//! - `secrets_backup_errors_total{class}` - Errors by classification
//! - `secrets_backup_bytes_uploaded_total` - Payload bytes written to the bucket
//! - `secrets_backup_run_duration_seconds` - Wall time of the run
//! - `secrets_backup_last_run_success` - 1 if the run completed, 0 if it aborted
//! - `secrets_backup_last_success_timestamp_seconds` - Unix time of the last completed run

use crate::error::BackupError;
use crate::reconciler::types::Decision;
use anyhow::{Context, Result};
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Metrics registry owned by a single run
#[derive(Clone)]
pub struct BackupMetrics {
    registry: Registry,
    secrets_total: IntCounter,
    outcomes_total: IntCounterVec,
    errors_total: IntCounterVec,
    bytes_uploaded_total: IntCounter,
    run_duration_seconds: Gauge,
    last_run_success: IntGauge,
    last_success_timestamp: IntGauge,
}

impl std::fmt::Debug for BackupMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupMetrics")
            .field("secrets_total", &self.secrets_total.get())
            .field("bytes_uploaded_total", &self.bytes_uploaded_total.get())
            .finish_non_exhaustive()
    }
}

impl BackupMetrics {
    /// Create and register all metrics
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let secrets_total = IntCounter::new(
            "secrets_backup_secrets_total",
            "Total number of secrets returned by the enumeration",
        )?;
        let outcomes_total = IntCounterVec::new(
            Opts::new(
                "secrets_backup_outcomes_total",
                "Per-secret outcomes (uploaded, current, skipped)",
            ),
            &["outcome"],
        )?;
        let errors_total = IntCounterVec::new(
            Opts::new(
                "secrets_backup_errors_total",
                "Errors encountered, by classification",
            ),
            &["class"],
        )?;
        let bytes_uploaded_total = IntCounter::new(
            "secrets_backup_bytes_uploaded_total",
            "Total payload bytes uploaded to the bucket",
        )?;
        let run_duration_seconds = Gauge::new(
            "secrets_backup_run_duration_seconds",
            "Duration of the backup run in seconds",
        )?;
        let last_run_success = IntGauge::new(
            "secrets_backup_last_run_success",
            "Whether the last backup run completed (1) or aborted (0)",
        )?;
        let last_success_timestamp = IntGauge::new(
            "secrets_backup_last_success_timestamp_seconds",
            "Unix timestamp of the last completed backup run",
        )?;

        registry.register(Box::new(secrets_total.clone()))?;
        registry.register(Box::new(outcomes_total.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(bytes_uploaded_total.clone()))?;
        registry.register(Box::new(run_duration_seconds.clone()))?;
        registry.register(Box::new(last_run_success.clone()))?;
        registry.register(Box::new(last_success_timestamp.clone()))?;

        Ok(Self {
            registry,
            secrets_total,
            outcomes_total,
            errors_total,
            bytes_uploaded_total,
            run_duration_seconds,
            last_run_success,
            last_success_timestamp,
        })
    }

    pub fn record_secrets_found(&self, count: usize) {
        self.secrets_total.inc_by(count as u64);
    }

    pub fn record_decision(&self, decision: Decision, payload_len: usize) {
        self.outcomes_total
            .with_label_values(&[decision.as_str()])
            .inc();
        if decision == Decision::Uploaded {
            self.bytes_uploaded_total.inc_by(payload_len as u64);
        }
    }

    pub fn record_skip(&self, error: &BackupError) {
        self.outcomes_total.with_label_values(&["skipped"]).inc();
        self.record_error(error);
    }

    pub fn record_error(&self, error: &BackupError) {
        self.errors_total
            .with_label_values(&[error.class().as_str()])
            .inc();
    }

    pub fn finish_run(&self, duration: Duration, success: bool) {
        self.run_duration_seconds.set(duration.as_secs_f64());
        self.last_run_success.set(i64::from(success));
        if success {
            self.last_success_timestamp
                .set(chrono::Utc::now().timestamp());
        }
    }

    /// Registry contents in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output is not valid UTF-8")
    }

    /// Write the registry to `path`, replacing it atomically
    ///
    /// The textfile collector may read the file at any moment, so the
    /// contents go to a temp file in the same directory which is then
    /// renamed over the target.
    pub fn write_textfile(&self, path: &Path) -> Result<()> {
        let rendered = self.render()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        file.write_all(rendered.as_bytes())
            .context("Failed to write metrics")?;
        file.persist(path)
            .with_context(|| format!("Failed to write metrics file {}", path.display()))?;
        Ok(())
    }
}
