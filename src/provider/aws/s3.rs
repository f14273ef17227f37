//! # S3 Backup Store
//!
//! Implements `BackupStore` on AWS S3 and S3-compatible storage.
//!
//! Payloads up to one part are written with a single `PutObject`. Larger
//! payloads use a multipart upload in part-size chunks; if any part or the
//! completion fails, the upload is aborted so no orphaned parts are left
//! behind.

use super::errors::{classify_sdk_error, describe};
use crate::constants::MAX_UPLOAD_PARTS;
use crate::error::{BackupError, ErrorClass};
use crate::pagination::{paginate, Page};
use crate::provider::BackupStore;
use crate::reconciler::types::{BackupKey, ExistingObjectSet};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use futures::TryStreamExt;
use std::ops::Range;
use tracing::{debug, info, info_span, warn, Instrument};

/// Connection settings for the destination bucket
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub part_size_bytes: u64,
    /// Custom S3-compatible endpoint (MinIO, Ceph, LocalStack)
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
}

/// S3 backup destination
pub struct S3BackupStore {
    client: Client,
    bucket: String,
    part_size: usize,
}

impl std::fmt::Debug for S3BackupStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3BackupStore")
            .field("bucket", &self.bucket)
            .field("part_size", &self.part_size)
            .finish_non_exhaustive()
    }
}

impl S3BackupStore {
    #[must_use]
    pub fn new(sdk_config: &SdkConfig, settings: &S3Settings) -> Self {
        let mut builder =
            aws_sdk_s3::config::Builder::from(sdk_config).force_path_style(settings.force_path_style);

        if let Some(endpoint_url) = settings.endpoint_url.as_deref() {
            debug!("Using custom S3 endpoint: {}", endpoint_url);
            builder = builder.endpoint_url(endpoint_url);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: settings.bucket.clone(),
            part_size: usize::try_from(settings.part_size_bytes).unwrap_or(usize::MAX),
        }
    }

    fn upload_error<E, R>(&self, key: &str, err: &SdkError<E, R>) -> BackupError
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        BackupError::Upload {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            class: classify_sdk_error(err, &[]),
            message: describe(err),
        }
    }

    fn upload_failure(&self, key: &str, message: impl Into<String>) -> BackupError {
        BackupError::Upload {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            class: ErrorClass::Fatal,
            message: message.into(),
        }
    }

    async fn put_single(&self, key: &str, payload: &[u8]) -> Result<(), BackupError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(payload.to_vec()))
            .send()
            .await
            .map_err(|e| self.upload_error(key, &e))?;
        Ok(())
    }

    async fn put_multipart(&self, key: &str, payload: &[u8]) -> Result<(), BackupError> {
        let ranges = part_ranges(payload.len(), self.part_size);
        if ranges.len() > MAX_UPLOAD_PARTS {
            return Err(self.upload_failure(
                key,
                format!(
                    "{} bytes needs {} parts, more than the {} S3 allows; raise the part size",
                    payload.len(),
                    ranges.len(),
                    MAX_UPLOAD_PARTS
                ),
            ));
        }

        info!(
            bucket = %self.bucket,
            key = key,
            parts = ranges.len(),
            "Uploading {} ({} bytes) in {} parts",
            key,
            payload.len(),
            ranges.len()
        );

        let create = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| self.upload_error(key, &e))?;

        let upload_id = create
            .upload_id()
            .ok_or_else(|| self.upload_failure(key, "no upload id returned"))?
            .to_string();

        let result = self.upload_parts(key, &upload_id, payload, &ranges).await;
        let result = match result {
            Ok(parts) => self.complete_upload(key, &upload_id, parts).await,
            Err(e) => Err(e),
        };

        if result.is_err() {
            self.abort_upload(key, &upload_id).await;
        }
        result
    }

    async fn upload_parts(
        &self,
        key: &str,
        upload_id: &str,
        payload: &[u8],
        ranges: &[Range<usize>],
    ) -> Result<Vec<CompletedPart>, BackupError> {
        let mut completed = Vec::with_capacity(ranges.len());

        for (index, range) in ranges.iter().enumerate() {
            // S3 part numbers start at 1; bounded by MAX_UPLOAD_PARTS
            let part_number = i32::try_from(index + 1)
                .map_err(|_| self.upload_failure(key, "part number out of range"))?;

            let response = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(payload[range.clone()].to_vec()))
                .send()
                .await
                .map_err(|e| self.upload_error(key, &e))?;

            let etag = response
                .e_tag()
                .ok_or_else(|| self.upload_failure(key, "no ETag returned for part"))?
                .to_string();

            debug!(
                "Uploaded part {}/{} of {}: {}",
                part_number,
                ranges.len(),
                key,
                etag
            );
            completed.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .e_tag(etag)
                    .build(),
            );
        }

        Ok(completed)
    }

    async fn complete_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: Vec<CompletedPart>,
    ) -> Result<(), BackupError> {
        let completed_upload = CompletedMultipartUpload::builder()
            .set_parts(Some(parts))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(completed_upload)
            .send()
            .await
            .map_err(|e| self.upload_error(key, &e))?;
        Ok(())
    }

    /// Best effort; the upload error is what gets reported
    async fn abort_upload(&self, key: &str, upload_id: &str) {
        if let Err(e) = self
            .client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
        {
            warn!(
                bucket = %self.bucket,
                key = key,
                upload_id = upload_id,
                "Failed to abort multipart upload: {}",
                describe(&e)
            );
        }
    }
}

#[async_trait]
impl BackupStore for S3BackupStore {
    async fn list_keys(&self, prefix: &str) -> Result<ExistingObjectSet, BackupError> {
        let span = info_span!("aws.s3.list", bucket = %self.bucket, prefix = prefix);
        let client = &self.client;
        let bucket = self.bucket.as_str();

        async move {
            let keys: Vec<String> = paginate(|token| async move {
                let output = client
                    .list_objects_v2()
                    .bucket(bucket)
                    .prefix(prefix)
                    .set_continuation_token(token)
                    .send()
                    .await
                    .map_err(|e| BackupError::ListObjects {
                        bucket: bucket.to_string(),
                        prefix: prefix.to_string(),
                        class: classify_sdk_error(&e, &[]),
                        message: describe(&e),
                    })?;

                let keys = output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(ToString::to_string))
                    .collect();

                let next_token = if output.is_truncated().unwrap_or(false) {
                    output.next_continuation_token().map(ToString::to_string)
                } else {
                    None
                };

                Ok::<_, BackupError>(Page::new(keys, next_token))
            })
            .try_collect()
            .await?;

            debug!("Found {} existing objects under {}", keys.len(), prefix);
            Ok(keys.into_iter().collect())
        }
        .instrument(span)
        .await
    }

    async fn upload(&self, key: &BackupKey, payload: &[u8]) -> Result<(), BackupError> {
        let key = key.as_str();
        let span = info_span!("aws.s3.upload", bucket = %self.bucket, key = key);

        async move {
            if payload.len() > self.part_size {
                self.put_multipart(key, payload).await
            } else {
                self.put_single(key, payload).await
            }
        }
        .instrument(span)
        .await
    }
}

/// Split `len` bytes into contiguous ranges of at most `part_size` bytes
///
/// Every range but the last is exactly `part_size` long.
#[must_use]
pub fn part_ranges(len: usize, part_size: usize) -> Vec<Range<usize>> {
    let part_size = part_size.max(1);
    (0..len)
        .step_by(part_size)
        .map(|start| start..len.min(start + part_size))
        .collect()
}
