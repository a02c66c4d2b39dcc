//! Link record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One shareable grant of anonymous, bounded access to a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LinkRecord {
    /// Administrative identifier.
    pub id: Uuid,
    /// Public credential embedded in the share URL.
    pub token: String,
    /// Bucket holding the shared object.
    pub bucket_name: String,
    /// Object key within the bucket.
    pub file_path: String,
    /// Display label for the object.
    pub file_name: String,
    /// Owning user.
    pub created_by: Uuid,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
    /// When the link stops granting access. Immutable.
    pub expires_at: DateTime<Utc>,
    /// Whether the link has been revoked. Never reverts to `false`.
    pub is_revoked: bool,
    /// When the link was revoked.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Who revoked the link (`None` for the expiry sweep).
    pub revoked_by: Option<Uuid>,
    /// Number of granted accesses.
    pub access_count: i64,
    /// Upper bound on `access_count` (`None` = unlimited).
    pub max_access: Option<i64>,
    /// Most recent granted access.
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// Free-text annotation.
    pub description: Option<String>,
}

impl LinkRecord {
    /// Whether `now` is past the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the access limit has been used up.
    pub fn is_exhausted(&self) -> bool {
        self.max_access
            .is_some_and(|max| self.access_count >= max)
    }

    /// Accesses left before the limit is reached (`None` = unlimited).
    pub fn remaining_accesses(&self) -> Option<i64> {
        self.max_access
            .map(|max| (max - self.access_count).max(0))
    }
}

/// Data required to persist a new link record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLinkRecord {
    /// Freshly minted token.
    pub token: String,
    /// Target bucket.
    pub bucket_name: String,
    /// Target object key.
    pub file_path: String,
    /// Display label.
    pub file_name: String,
    /// Owning user.
    pub created_by: Uuid,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Optional access limit.
    pub max_access: Option<i64>,
    /// Optional annotation.
    pub description: Option<String>,
}

/// A state transition applied atomically to a single link record.
///
/// Each variant is a conditional update; the store applies it only when
/// the guard holds and reports whether it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LinkUpdate {
    /// Mark revoked. Guard: not already revoked.
    Revoke {
        /// The revoking user.
        revoked_by: Uuid,
        /// Revocation instant.
        revoked_at: DateTime<Utc>,
    },
    /// Count one granted access. Guard: not revoked, not expired at
    /// `accessed_at`, and `access_count < max_access` when a limit is set.
    RecordAccess {
        /// Access instant.
        accessed_at: DateTime<Utc>,
    },
}

impl LinkUpdate {
    /// Whether the guard of this update holds for `record`.
    pub fn applies_to(&self, record: &LinkRecord) -> bool {
        match self {
            Self::Revoke { .. } => !record.is_revoked,
            Self::RecordAccess { accessed_at } => {
                !record.is_revoked && !record.is_expired_at(*accessed_at) && !record.is_exhausted()
            }
        }
    }

    /// Applies the update to `record` in place. Callers check
    /// [`applies_to`](Self::applies_to) first.
    pub fn apply(&self, record: &mut LinkRecord) {
        match *self {
            Self::Revoke {
                revoked_by,
                revoked_at,
            } => {
                record.is_revoked = true;
                record.revoked_at = Some(revoked_at);
                record.revoked_by = Some(revoked_by);
            }
            Self::RecordAccess { accessed_at } => {
                record.access_count += 1;
                record.last_accessed_at = Some(accessed_at);
            }
        }
    }
}
