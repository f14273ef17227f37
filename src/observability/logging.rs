//! # Logging
//!
//! Tracing subscriber setup.

use crate::config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `default_directive`. Safe to call more
/// than once; later calls leave the first subscriber in place.
pub fn init(default_directive: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new(crate::constants::DEFAULT_LOG_LEVEL));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Text => builder.with_target(false).try_init(),
    };

    if let Err(e) = result {
        tracing::warn!("Tracing subscriber already initialized: {}", e);
    }
}
