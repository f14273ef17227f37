//! # Observability
//!
//! - `logging`: tracing subscriber setup
//! - `metrics`: Prometheus metrics for a run

pub mod logging;
pub mod metrics;

pub use metrics::BackupMetrics;
