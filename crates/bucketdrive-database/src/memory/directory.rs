//! In-memory user directory and bucket grants.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use bucketdrive_core::result::AppResult;
use bucketdrive_entity::permission::PermissionSet;
use bucketdrive_entity::user::UserProfile;

use crate::store::DirectoryStore;

/// In-memory directory keyed by user id and `(user id, bucket)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectoryStore {
    users: Arc<DashMap<Uuid, UserProfile>>,
    grants: Arc<DashMap<(Uuid, String), PermissionSet>>,
}

impl MemoryDirectoryStore {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub fn upsert_user(&self, user: UserProfile) {
        self.users.insert(user.id, user);
    }

    /// Grant `permissions` on `bucket` to `user_id`, replacing any previous grant.
    pub fn grant(&self, user_id: Uuid, bucket: impl Into<String>, permissions: PermissionSet) {
        self.grants.insert((user_id, bucket.into()), permissions);
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectoryStore {
    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.users.get(&user_id).map(|u| u.value().clone()))
    }

    async fn bucket_permissions(
        &self,
        user_id: Uuid,
        bucket: &str,
    ) -> AppResult<Option<PermissionSet>> {
        Ok(self
            .grants
            .get(&(user_id, bucket.to_string()))
            .map(|g| *g.value()))
    }
}
