//! S3-compatible object storage provider (requires the `s3` feature).

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use bucketdrive_core::config::S3StorageConfig;
use bucketdrive_core::error::{AppError, ErrorKind};
use bucketdrive_core::result::AppResult;
use bucketdrive_core::traits::object_store::{ObjectMeta, ObjectStore};

/// S3-compatible object store. BucketDrive buckets map one-to-one onto S3
/// buckets.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Create a new S3 object store from configuration.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            force_path_style = config.force_path_style,
            "Initializing S3 object store"
        );

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "bucketdrive-config",
            ));
        }
        let shared = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&shared).force_path_style(config.force_path_style);
        if !config.endpoint.is_empty() {
            builder = builder.endpoint_url(config.endpoint.clone());
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
        })
    }
}

fn to_utc(value: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn exists(&self, bucket: &str, path: &str) -> AppResult<bool> {
        match self.stat(bucket, path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is(ErrorKind::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn stat(&self, bucket: &str, path: &str) -> AppResult<ObjectMeta> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    AppError::not_found(format!("Object '{bucket}/{path}' not found"))
                } else {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to stat '{bucket}/{path}'"),
                        e,
                    )
                }
            })?;

        Ok(ObjectMeta {
            bucket: bucket.to_string(),
            path: path.to_string(),
            size_bytes: output.content_length().unwrap_or(0).max(0) as u64,
            content_type: output.content_type().map(str::to_string),
            last_modified: output.last_modified().and_then(to_utc),
        })
    }

    async fn read_all(&self, bucket: &str, path: &str) -> AppResult<Bytes> {
        debug!(bucket, path, "Reading object from S3");
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::not_found(format!("Object '{bucket}/{path}' not found"))
                } else {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to read '{bucket}/{path}'"),
                        e,
                    )
                }
            })?;

        let data = output.body.collect().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stream '{bucket}/{path}'"),
                e,
            )
        })?;
        Ok(data.into_bytes())
    }
}
