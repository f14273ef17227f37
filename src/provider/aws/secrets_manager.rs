//! # AWS Secrets Manager Store
//!
//! Implements `SecretStore` for AWS Secrets Manager.

use super::errors::{classify_sdk_error, describe, FETCH_IGNORABLE_CODES};
use crate::constants::CURRENT_VERSION_STAGE;
use crate::error::BackupError;
use crate::pagination::{paginate, Page};
use crate::provider::SecretStore;
use crate::reconciler::types::SecretRecord;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueOutput;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use futures::TryStreamExt;
use tracing::{debug, debug_span, info, info_span, Instrument};

/// AWS Secrets Manager secret source
pub struct AwsSecretStore {
    client: SecretsManagerClient,
    region: String,
}

impl std::fmt::Debug for AwsSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSecretStore")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsSecretStore {
    #[must_use]
    pub fn new(sdk_config: &SdkConfig) -> Self {
        let region = sdk_config
            .region()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);

        Self {
            client: SecretsManagerClient::new(sdk_config),
            region,
        }
    }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    async fn list_secret_names(&self) -> Result<Vec<String>, BackupError> {
        let span = info_span!("aws.secrets.list", region = %self.region);
        let client = &self.client;

        async move {
            let names: Vec<String> = paginate(|token| async move {
                let output = client
                    .list_secrets()
                    .set_next_token(token)
                    .send()
                    .await
                    .map_err(|e| BackupError::ListSecrets {
                        class: classify_sdk_error(&e, &[]),
                        message: describe(&e),
                    })?;

                let names = output
                    .secret_list()
                    .iter()
                    .filter_map(|entry| entry.name().map(ToString::to_string))
                    .collect();

                Ok::<_, BackupError>(Page::new(
                    names,
                    output.next_token().map(ToString::to_string),
                ))
            })
            .try_collect()
            .await?;

            if names.is_empty() {
                return Err(BackupError::NoSecrets);
            }

            info!(
                region = %self.region,
                count = names.len(),
                "Found {} secrets",
                names.len()
            );
            Ok(names)
        }
        .instrument(span)
        .await
    }

    async fn fetch_current_value(&self, name: &str) -> Result<SecretRecord, BackupError> {
        let span = debug_span!("aws.secret.get", secret.name = name, region = %self.region);

        async move {
            let output = self
                .client
                .get_secret_value()
                .secret_id(name)
                .version_stage(CURRENT_VERSION_STAGE)
                .send()
                .await
                .map_err(|e| BackupError::FetchSecret {
                    name: name.to_string(),
                    class: classify_sdk_error(&e, FETCH_IGNORABLE_CODES),
                    message: describe(&e),
                })?;

            let record = record_from_output(name, &output)?;
            debug!(
                secret_name = %record.name,
                version_id = %record.version_id,
                "Fetched current version of {}",
                record.name
            );
            Ok(record)
        }
        .instrument(span)
        .await
    }
}

/// Build a record from a `GetSecretValue` response
///
/// The key uses the name echoed by the service (the requested id may be an
/// ARN). `SecretString` is preferred over `SecretBinary`.
pub(crate) fn record_from_output(
    requested: &str,
    output: &GetSecretValueOutput,
) -> Result<SecretRecord, BackupError> {
    let name = output.name().unwrap_or(requested);

    let version_id = output
        .version_id()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BackupError::MissingVersion {
            name: name.to_string(),
        })?;

    let payload = match (output.secret_string(), output.secret_binary()) {
        (Some(value), _) => value.as_bytes().to_vec(),
        (None, Some(blob)) => blob.as_ref().to_vec(),
        (None, None) => {
            return Err(BackupError::EmptyValue {
                name: name.to_string(),
            })
        }
    };

    Ok(SecretRecord::new(name, version_id, payload))
}
