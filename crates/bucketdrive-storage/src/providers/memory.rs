//! In-memory object store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use bucketdrive_core::error::AppError;
use bucketdrive_core::result::AppResult;
use bucketdrive_core::traits::object_store::{ObjectMeta, ObjectStore};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    last_modified: DateTime<Utc>,
}

/// Object store held entirely in memory, keyed by `(bucket, path)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<DashMap<(String, String), StoredObject>>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` at `(bucket, path)`, replacing any previous object.
    pub fn put(
        &self,
        bucket: impl Into<String>,
        path: impl Into<String>,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
    ) {
        self.objects.insert(
            (bucket.into(), path.into()),
            StoredObject {
                data: data.into(),
                content_type: content_type.map(str::to_string),
                last_modified: Utc::now(),
            },
        );
    }

    fn get(&self, bucket: &str, path: &str) -> AppResult<StoredObject> {
        self.objects
            .get(&(bucket.to_string(), path.to_string()))
            .map(|o| o.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Object '{bucket}/{path}' not found")))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn exists(&self, bucket: &str, path: &str) -> AppResult<bool> {
        Ok(self
            .objects
            .contains_key(&(bucket.to_string(), path.to_string())))
    }

    async fn stat(&self, bucket: &str, path: &str) -> AppResult<ObjectMeta> {
        let object = self.get(bucket, path)?;
        Ok(ObjectMeta {
            bucket: bucket.to_string(),
            path: path.to_string(),
            size_bytes: object.data.len() as u64,
            content_type: object.content_type,
            last_modified: Some(object.last_modified),
        })
    }

    async fn read_all(&self, bucket: &str, path: &str) -> AppResult<Bytes> {
        Ok(self.get(bucket, path)?.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucketdrive_core::error::ErrorKind;

    #[tokio::test]
    async fn test_put_and_read() {
        let store = MemoryObjectStore::new();
        store.put("media", "a/b.txt", "hello", Some("text/plain"));

        assert!(store.exists("media", "a/b.txt").await.unwrap());
        assert!(!store.exists("other", "a/b.txt").await.unwrap());
        assert_eq!(
            store.read_all("media", "a/b.txt").await.unwrap(),
            Bytes::from("hello")
        );

        let meta = store.stat("media", "a/b.txt").await.unwrap();
        assert_eq!(meta.size_bytes, 5);
        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let store = MemoryObjectStore::new();
        let err = store.read_all("media", "nope").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
