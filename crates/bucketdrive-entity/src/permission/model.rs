//! Per-bucket permission model.
//!
//! Permissions are a flat lookup of `user × bucket → {read, write, delete}`.
//! There is no inheritance between buckets or roles; administrators bypass
//! the lookup entirely.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single permission on a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketPermission {
    /// List and download objects.
    Read,
    /// Upload and modify objects.
    Write,
    /// Delete objects.
    Delete,
}

impl BucketPermission {
    /// Return the permission as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for BucketPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of permissions a user holds on one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PermissionSet {
    /// `read` granted.
    pub can_read: bool,
    /// `write` granted.
    pub can_write: bool,
    /// `delete` granted.
    pub can_delete: bool,
}

impl PermissionSet {
    /// A set holding only `read`.
    pub fn read_only() -> Self {
        Self {
            can_read: true,
            ..Self::default()
        }
    }

    /// A set holding every permission.
    pub fn all() -> Self {
        Self {
            can_read: true,
            can_write: true,
            can_delete: true,
        }
    }

    /// Whether `permission` is in the set.
    pub fn contains(&self, permission: BucketPermission) -> bool {
        match permission {
            BucketPermission::Read => self.can_read,
            BucketPermission::Write => self.can_write,
            BucketPermission::Delete => self.can_delete,
        }
    }

    /// Adds `permission` to the set.
    pub fn insert(&mut self, permission: BucketPermission) {
        match permission {
            BucketPermission::Read => self.can_read = true,
            BucketPermission::Write => self.can_write = true,
            BucketPermission::Delete => self.can_delete = true,
        }
    }
}

impl FromIterator<BucketPermission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = BucketPermission>>(iter: I) -> Self {
        let mut set = Self::default();
        for permission in iter {
            set.insert(permission);
        }
        set
    }
}

/// Permission data fetched for one user, handed to the authorization gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    /// The user the snapshot describes.
    pub user_id: Uuid,
    /// Whether the user is an administrator.
    pub is_admin: bool,
    /// Buckets the user has been granted, with the permissions held on each.
    pub buckets: HashMap<String, PermissionSet>,
}

impl PermissionSnapshot {
    /// Snapshot for a user with no bucket grants.
    pub fn new(user_id: Uuid, is_admin: bool) -> Self {
        Self {
            user_id,
            is_admin,
            buckets: HashMap::new(),
        }
    }

    /// Adds a bucket grant.
    pub fn with_bucket(mut self, bucket: impl Into<String>, permissions: PermissionSet) -> Self {
        self.buckets.insert(bucket.into(), permissions);
        self
    }

    /// Permissions held on `bucket`, if the user has access to it at all.
    pub fn bucket(&self, bucket: &str) -> Option<&PermissionSet> {
        self.buckets.get(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_from_iter() {
        let set: PermissionSet = [BucketPermission::Read, BucketPermission::Delete]
            .into_iter()
            .collect();
        assert!(set.contains(BucketPermission::Read));
        assert!(!set.contains(BucketPermission::Write));
        assert!(set.contains(BucketPermission::Delete));
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = PermissionSnapshot::new(Uuid::new_v4(), false)
            .with_bucket("media", PermissionSet::read_only());
        assert!(snapshot.bucket("media").is_some());
        assert!(snapshot.bucket("finance").is_none());
    }
}
