//! Authorization predicates for shared links.
//!
//! The gate performs no I/O. Callers fetch a [`PermissionSnapshot`] from the
//! directory first and hand it in.

use uuid::Uuid;

use bucketdrive_core::error::AppError;
use bucketdrive_entity::link::LinkRecord;
use bucketdrive_entity::permission::{BucketPermission, PermissionSnapshot};

/// Decides who may create and revoke shared links.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGate;

impl AuthorizationGate {
    /// Creates a new gate.
    pub fn new() -> Self {
        Self
    }

    /// True iff the user is an admin, or holds `read` on `bucket`.
    pub fn can_create_link(&self, snapshot: &PermissionSnapshot, bucket: &str) -> bool {
        snapshot.is_admin
            || snapshot
                .bucket(bucket)
                .is_some_and(|set| set.contains(BucketPermission::Read))
    }

    /// True iff the user is an admin or owns `record`.
    pub fn can_revoke_link(&self, user_id: Uuid, record: &LinkRecord, is_admin: bool) -> bool {
        is_admin || user_id == record.created_by
    }

    /// Same rule as [`Self::can_revoke_link`]; owners and admins may view a link.
    pub fn can_view_link(&self, user_id: Uuid, record: &LinkRecord, is_admin: bool) -> bool {
        self.can_revoke_link(user_id, record, is_admin)
    }

    /// Like [`Self::can_create_link`], failing with `Authorization`.
    pub fn require_create(&self, snapshot: &PermissionSnapshot, bucket: &str) -> Result<(), AppError> {
        if self.can_create_link(snapshot, bucket) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Read permission on bucket '{bucket}' is required to share files"
            )))
        }
    }
}
