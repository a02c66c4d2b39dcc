//! User directory and bucket grant repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bucketdrive_core::error::{AppError, ErrorKind};
use bucketdrive_core::result::AppResult;
use bucketdrive_entity::permission::PermissionSet;
use bucketdrive_entity::user::UserProfile;

use crate::store::DirectoryStore;

/// PostgreSQL-backed directory over the `users` and `bucket_grants` tables.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Create a new directory repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for DirectoryRepository {
    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT id, email, role, is_active FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn bucket_permissions(
        &self,
        user_id: Uuid,
        bucket: &str,
    ) -> AppResult<Option<PermissionSet>> {
        sqlx::query_as::<_, PermissionSet>(
            "SELECT can_read, can_write, can_delete FROM bucket_grants \
             WHERE user_id = $1 AND bucket_name = $2",
        )
        .bind(user_id)
        .bind(bucket)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load bucket permissions", e)
        })
    }
}
