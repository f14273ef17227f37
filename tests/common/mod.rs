//! Common test utilities for reconciliation tests
//!
//! In-memory `SecretStore` and `BackupStore` implementations that record the
//! calls made against them.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use async_trait::async_trait;
use secrets_backup::prelude::*;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// What fetching a given secret yields
#[derive(Debug, Clone)]
pub enum FakeSecret {
    Value { version_id: String, payload: Vec<u8> },
    Fails(ErrorClass),
}

/// Secret store backed by an ordered list of secrets
#[derive(Debug, Default)]
pub struct FakeSecretStore {
    secrets: Vec<(String, FakeSecret)>,
    list_error: Option<ErrorClass>,
    pub fetched: Mutex<Vec<String>>,
}

impl FakeSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, name: &str, version_id: &str, payload: &str) -> Self {
        self.secrets.push((
            name.to_string(),
            FakeSecret::Value {
                version_id: version_id.to_string(),
                payload: payload.as_bytes().to_vec(),
            },
        ));
        self
    }

    pub fn with_failing_secret(mut self, name: &str, class: ErrorClass) -> Self {
        self.secrets
            .push((name.to_string(), FakeSecret::Fails(class)));
        self
    }

    pub fn failing_list(mut self, class: ErrorClass) -> Self {
        self.list_error = Some(class);
        self
    }

    /// Replace the current version of a secret
    pub fn rotate(&mut self, name: &str, version_id: &str, payload: &str) {
        for (secret_name, secret) in &mut self.secrets {
            if secret_name == name {
                *secret = FakeSecret::Value {
                    version_id: version_id.to_string(),
                    payload: payload.as_bytes().to_vec(),
                };
            }
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretStore for FakeSecretStore {
    async fn list_secret_names(&self) -> Result<Vec<String>, BackupError> {
        if let Some(class) = self.list_error {
            return Err(BackupError::ListSecrets {
                class,
                message: "AccessDeniedException".to_string(),
            });
        }
        if self.secrets.is_empty() {
            return Err(BackupError::NoSecrets);
        }
        Ok(self.secrets.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn fetch_current_value(&self, name: &str) -> Result<SecretRecord, BackupError> {
        self.fetched.lock().unwrap().push(name.to_string());

        let secret = self
            .secrets
            .iter()
            .find(|(secret_name, _)| secret_name == name)
            .map(|(_, secret)| secret.clone());

        match secret {
            Some(FakeSecret::Value {
                version_id,
                payload,
            }) => Ok(SecretRecord::new(name, version_id, payload)),
            Some(FakeSecret::Fails(class)) => Err(BackupError::FetchSecret {
                name: name.to_string(),
                class,
                message: "ResourceNotFoundException: Secrets Manager can't find the specified secret value for staging label: AWSCURRENT".to_string(),
            }),
            None => Err(BackupError::FetchSecret {
                name: name.to_string(),
                class: ErrorClass::Ignorable,
                message: "ResourceNotFoundException".to_string(),
            }),
        }
    }
}

/// Bucket backed by a sorted map of key to payload
#[derive(Debug, Default)]
pub struct FakeBucket {
    pub objects: Mutex<BTreeMap<String, Vec<u8>>>,
    pub listed_prefixes: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<String>>,
    fail_list: bool,
    fail_upload: bool,
}

impl FakeBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, key: &str, payload: &str) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), payload.as_bytes().to_vec());
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn list_count(&self) -> usize {
        self.listed_prefixes.lock().unwrap().len()
    }
}

#[async_trait]
impl BackupStore for FakeBucket {
    async fn list_keys(&self, prefix: &str) -> Result<ExistingObjectSet, BackupError> {
        self.listed_prefixes.lock().unwrap().push(prefix.to_string());
        if self.fail_list {
            return Err(BackupError::ListObjects {
                bucket: "test-bucket".to_string(),
                prefix: prefix.to_string(),
                class: ErrorClass::Fatal,
                message: "AccessDenied".to_string(),
            });
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn upload(&self, key: &BackupKey, payload: &[u8]) -> Result<(), BackupError> {
        self.uploads.lock().unwrap().push(key.to_string());
        if self.fail_upload {
            return Err(BackupError::Upload {
                bucket: "test-bucket".to_string(),
                key: key.to_string(),
                class: ErrorClass::Fatal,
                message: "AccessDenied".to_string(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), payload.to_vec());
        Ok(())
    }
}
