//! # bucketdrive-storage
//!
//! Object storage providers for BucketDrive. Supports S3-compatible object
//! stores and an in-memory store for tests and local development.

pub mod providers;

use std::sync::Arc;

use bucketdrive_core::config::StorageConfig;
use bucketdrive_core::error::AppError;
use bucketdrive_core::result::AppResult;
use bucketdrive_core::traits::object_store::ObjectStore;

pub use providers::memory::MemoryObjectStore;
#[cfg(feature = "s3")]
pub use providers::s3::S3ObjectStore;

/// Build the object store selected by `config.provider`.
pub async fn build_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    match config.provider.as_str() {
        "memory" => Ok(Arc::new(MemoryObjectStore::new())),
        #[cfg(feature = "s3")]
        "s3" => Ok(Arc::new(S3ObjectStore::new(&config.s3).await?)),
        other => Err(AppError::configuration(format!(
            "Unsupported storage provider '{other}'"
        ))),
    }
}
