//! Request DTOs.

use serde::{Deserialize, Serialize};

use bucketdrive_service::CreateLinkRequest;

/// Create shared link request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareRequest {
    /// Bucket holding the object.
    pub bucket_name: String,
    /// Object key.
    pub file_path: String,
    /// Display name (defaults to the last path segment).
    pub file_name: Option<String>,
    /// Lifetime in hours.
    pub expires_in_hours: i64,
    /// Access limit (None = unlimited).
    pub max_access: Option<i64>,
    /// Free-text annotation.
    pub description: Option<String>,
}

impl From<CreateShareRequest> for CreateLinkRequest {
    fn from(req: CreateShareRequest) -> Self {
        Self {
            bucket_name: req.bucket_name,
            file_path: req.file_path,
            file_name: req.file_name.unwrap_or_default(),
            expires_in_hours: req.expires_in_hours,
            max_access: req.max_access,
            description: req.description.filter(|d| !d.trim().is_empty()),
        }
    }
}
