//! Releases object bytes behind a shared link.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use bucketdrive_core::error::AppError;
use bucketdrive_core::result::AppResult;
use bucketdrive_core::traits::object_store::{ObjectMeta, ObjectStore};
use bucketdrive_entity::link::{AccessDecision, LinkRecord};

use super::service::ShareLinkService;

/// A granted download.
#[derive(Debug, Clone)]
pub struct SharedFile {
    /// The link after the access was counted.
    pub record: LinkRecord,
    /// Object metadata.
    pub meta: ObjectMeta,
    /// Object contents.
    pub data: Bytes,
}

/// Result of presenting a token for download.
#[derive(Debug, Clone)]
pub enum DownloadOutcome {
    /// Access granted and the object was read.
    Granted(SharedFile),
    /// Access denied; no bytes were read.
    Denied(AccessDecision),
}

/// Resolves share tokens and reads the shared object on `Allow`.
#[derive(Debug, Clone)]
pub struct SharedDownloadService {
    shares: Arc<ShareLinkService>,
    objects: Arc<dyn ObjectStore>,
}

impl SharedDownloadService {
    /// Creates a new download service.
    pub fn new(shares: Arc<ShareLinkService>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { shares, objects }
    }

    /// Resolve `token` at `now` and, when allowed, read the object.
    ///
    /// The access is counted before the object is read, so a download that
    /// fails afterwards still uses up one access.
    pub async fn download(&self, token: &str, now: DateTime<Utc>) -> AppResult<DownloadOutcome> {
        let resolution = self.shares.resolve_for_access(token, now).await?;
        let record = match resolution.record {
            Some(record) if resolution.decision.is_allowed() => record,
            _ => return Ok(DownloadOutcome::Denied(resolution.decision)),
        };

        if !self
            .objects
            .exists(&record.bucket_name, &record.file_path)
            .await?
        {
            warn!(
                link_id = %record.id,
                bucket = %record.bucket_name,
                path = %record.file_path,
                "Shared object no longer exists"
            );
            return Err(AppError::not_found("Shared file no longer exists"));
        }

        let meta = self
            .objects
            .stat(&record.bucket_name, &record.file_path)
            .await?;
        let data = self
            .objects
            .read_all(&record.bucket_name, &record.file_path)
            .await?;

        info!(
            link_id = %record.id,
            size = data.len(),
            access_count = record.access_count,
            "Shared file downloaded"
        );

        Ok(DownloadOutcome::Granted(SharedFile { record, meta, data }))
    }
}
