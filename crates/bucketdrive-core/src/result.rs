//! Convenience result type alias for BucketDrive.

use crate::error::AppError;

/// A specialized `Result` type for BucketDrive operations.
pub type AppResult<T> = Result<T, AppError>;
