//! Object storage collaborator.
//!
//! Objects are addressed by `(bucket, path)`. Only the read side is needed
//! once a shared link has been granted; listing, writes, copies and moves
//! belong to the file-browser surface.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ObjectMeta {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object key within the bucket.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type (if known).
    pub content_type: Option<String>,
    /// Last modified timestamp.
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// Read access to an object-storage backend.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "s3", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether an object exists.
    async fn exists(&self, bucket: &str, path: &str) -> AppResult<bool>;

    /// Get metadata about an object.
    async fn stat(&self, bucket: &str, path: &str) -> AppResult<ObjectMeta>;

    /// Read an object into memory.
    async fn read_all(&self, bucket: &str, path: &str) -> AppResult<Bytes>;
}
