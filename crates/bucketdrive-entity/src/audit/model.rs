//! Audit event entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use bucketdrive_core::AppError;

/// Actions recorded for shared link transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A link was created.
    SharedLinkCreated,
    /// A link was revoked by its owner or an administrator.
    SharedLinkRevoked,
    /// Expired links were marked revoked by the sweep.
    SharedLinksSwept,
}

impl AuditAction {
    /// Return the action as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SharedLinkCreated => "shared_link_created",
            Self::SharedLinkRevoked => "shared_link_revoked",
            Self::SharedLinksSwept => "shared_links_swept",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource types that share the audit event shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResourceType {
    /// A shared link record.
    SharedLink,
    /// A user account.
    User,
    /// A storage bucket.
    Bucket,
    /// A bucket permission grant.
    Permission,
}

impl AuditResourceType {
    /// Return the resource type as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SharedLink => "shared_link",
            Self::User => "user",
            Self::Bucket => "bucket",
            Self::Permission => "permission",
        }
    }
}

impl fmt::Display for AuditResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditResourceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shared_link" => Ok(Self::SharedLink),
            "user" => Ok(Self::User),
            "bucket" => Ok(Self::Bucket),
            "permission" => Ok(Self::Permission),
            _ => Err(AppError::validation(format!(
                "Invalid audit resource type: '{s}'"
            ))),
        }
    }
}

/// An immutable audit event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// The acting user (`None` for system jobs).
    pub actor_id: Option<Uuid>,
    /// The action performed (e.g. `"shared_link_created"`).
    pub action: String,
    /// The type of the affected resource.
    pub resource_type: String,
    /// The affected resource (if a single one).
    pub resource_id: Option<Uuid>,
    /// Additional details.
    pub details: Option<serde_json::Value>,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// Data required to append an audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEvent {
    /// The acting user.
    pub actor_id: Option<Uuid>,
    /// The action performed.
    pub action: AuditAction,
    /// The type of the affected resource.
    pub resource_type: AuditResourceType,
    /// The affected resource.
    pub resource_id: Option<Uuid>,
    /// Additional details.
    pub details: Option<serde_json::Value>,
    /// When the event happened.
    pub created_at: DateTime<Utc>,
}
