//! # AWS Authentication
//!
//! Builds the shared AWS SDK configuration.
//!
//! Credentials always come from the SDK default chain: environment
//! variables, shared config/credentials files (including SSO and assumed-role
//! profiles), web identity tokens (IRSA / OIDC roles) and instance or
//! container metadata. The job never reads access keys itself.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;

/// Create AWS SDK config from the default credential chain
///
/// When `region` is `None` the SDK default region chain decides
/// (`AWS_REGION`, `AWS_DEFAULT_REGION`, profile, instance metadata).
pub async fn create_sdk_config(region: Option<&str>) -> SdkConfig {
    let mut builder = aws_config::defaults(BehaviorVersion::latest());

    match region {
        Some(region) => {
            info!(region = region, "Using AWS region {}", region);
            builder = builder.region(Region::new(region.to_string()));
        }
        None => {
            info!("No region specified, using the AWS SDK default region chain");
        }
    }

    builder.load().await
}
