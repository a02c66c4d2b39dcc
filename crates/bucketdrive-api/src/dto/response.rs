//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bucketdrive_core::config::ShareConfig;
use bucketdrive_entity::link::{AccessDecision, LinkRecord};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A shared link as shown to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLinkResponse {
    /// Link ID.
    pub id: Uuid,
    /// Public token.
    pub token: String,
    /// Public URL.
    pub share_url: String,
    /// Bucket.
    pub bucket_name: String,
    /// Object key.
    pub file_path: String,
    /// Display name.
    pub file_name: String,
    /// Owner.
    pub created_by: Uuid,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// Revoked flag.
    pub is_revoked: bool,
    /// Revocation time.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Revoking user (None when revoked by the expiry sweep).
    pub revoked_by: Option<Uuid>,
    /// Accesses granted so far.
    pub access_count: i64,
    /// Access limit.
    pub max_access: Option<i64>,
    /// Accesses left, when limited.
    pub remaining_accesses: Option<i64>,
    /// Last granted access.
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// Annotation.
    pub description: Option<String>,
}

impl ShareLinkResponse {
    /// Builds the owner view of `record`.
    pub fn from_record(record: LinkRecord, share: &ShareConfig) -> Self {
        Self {
            share_url: share.share_url(&record.token),
            remaining_accesses: record.remaining_accesses(),
            id: record.id,
            token: record.token,
            bucket_name: record.bucket_name,
            file_path: record.file_path,
            file_name: record.file_name,
            created_by: record.created_by,
            created_at: record.created_at,
            expires_at: record.expires_at,
            is_revoked: record.is_revoked,
            revoked_at: record.revoked_at,
            revoked_by: record.revoked_by,
            access_count: record.access_count,
            max_access: record.max_access,
            last_accessed_at: record.last_accessed_at,
            description: record.description,
        }
    }
}

/// Body of a successful create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareResponse {
    /// The new link.
    pub link: ShareLinkResponse,
    /// Public URL to hand out.
    pub share_url: String,
}

/// What an anonymous holder of a token may learn about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicLinkInfo {
    /// Display name.
    pub file_name: String,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// Accesses granted so far.
    pub access_count: i64,
    /// Access limit.
    pub max_access: Option<i64>,
    /// Accesses left, when limited.
    pub remaining_accesses: Option<i64>,
    /// Annotation.
    pub description: Option<String>,
    /// Decision a download would get right now.
    pub status: AccessDecision,
}

impl PublicLinkInfo {
    /// Builds the public view of `record`.
    pub fn new(record: LinkRecord, status: AccessDecision) -> Self {
        Self {
            remaining_accesses: record.remaining_accesses(),
            file_name: record.file_name,
            expires_at: record.expires_at,
            access_count: record.access_count,
            max_access: record.max_access,
            description: record.description,
            status,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
    /// Database status (`connected`, `unavailable` or `not_configured`).
    pub database: String,
}
