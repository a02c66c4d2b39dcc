//! Shared link repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use bucketdrive_core::error::{AppError, ErrorKind};
use bucketdrive_core::result::AppResult;
use bucketdrive_entity::link::{CreateLinkRecord, LinkRecord, LinkUpdate};

use crate::store::LinkStore;

/// PostgreSQL-backed link store.
///
/// Conditional updates rely on row-level locking: concurrent `UPDATE`s of
/// the same row serialize and each re-checks its `WHERE` guard against the
/// committed state.
#[derive(Debug, Clone)]
pub struct LinkRepository {
    pool: PgPool,
}

impl LinkRepository {
    /// Create a new link repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkStore for LinkRepository {
    async fn insert(&self, data: &CreateLinkRecord) -> AppResult<LinkRecord> {
        sqlx::query_as::<_, LinkRecord>(
            "INSERT INTO shared_links (token, bucket_name, file_path, file_name, created_by, \
             created_at, expires_at, max_access, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(&data.token)
        .bind(&data.bucket_name)
        .bind(&data.file_path)
        .bind(&data.file_name)
        .bind(data.created_by)
        .bind(data.created_at)
        .bind(data.expires_at)
        .bind(data.max_access)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if duplicate {
                AppError::with_source(ErrorKind::Conflict, "Share token already exists", e)
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create shared link", e)
            }
        })
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<LinkRecord>> {
        sqlx::query_as::<_, LinkRecord>("SELECT * FROM shared_links WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find shared link by token", e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<LinkRecord>> {
        sqlx::query_as::<_, LinkRecord>("SELECT * FROM shared_links WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find shared link", e))
    }

    async fn find_by_owner(&self, user_id: Uuid) -> AppResult<Vec<LinkRecord>> {
        sqlx::query_as::<_, LinkRecord>(
            "SELECT * FROM shared_links WHERE created_by = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list shared links", e))
    }

    async fn update(&self, id: Uuid, change: LinkUpdate) -> AppResult<Option<LinkRecord>> {
        let query = match change {
            LinkUpdate::Revoke {
                revoked_by,
                revoked_at,
            } => sqlx::query_as::<_, LinkRecord>(
                "UPDATE shared_links SET is_revoked = TRUE, revoked_at = $2, revoked_by = $3 \
                 WHERE id = $1 AND is_revoked = FALSE RETURNING *",
            )
            .bind(id)
            .bind(revoked_at)
            .bind(revoked_by),
            LinkUpdate::RecordAccess { accessed_at } => sqlx::query_as::<_, LinkRecord>(
                "UPDATE shared_links SET access_count = access_count + 1, last_accessed_at = $2 \
                 WHERE id = $1 AND is_revoked = FALSE AND expires_at >= $2 \
                 AND (max_access IS NULL OR access_count < max_access) RETURNING *",
            )
            .bind(id)
            .bind(accessed_at),
        };

        query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update shared link", e))
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE shared_links SET is_revoked = TRUE, revoked_at = $1 \
             WHERE expires_at < $1 AND is_revoked = FALSE",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to sweep expired shared links", e)
        })?;
        Ok(result.rows_affected())
    }
}
