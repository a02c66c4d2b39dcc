//! Audit event repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bucketdrive_core::error::{AppError, ErrorKind};
use bucketdrive_core::result::AppResult;
use bucketdrive_entity::audit::{AuditEvent, AuditResourceType, CreateAuditEvent};

use crate::store::AuditStore;

/// PostgreSQL-backed append-only audit log.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    /// Create a new audit repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for AuditRepository {
    async fn append(&self, event: &CreateAuditEvent) -> AppResult<AuditEvent> {
        sqlx::query_as::<_, AuditEvent>(
            "INSERT INTO audit_events (actor_id, action, resource_type, resource_id, details, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(event.actor_id)
        .bind(event.action.as_str())
        .bind(event.resource_type.as_str())
        .bind(event.resource_id)
        .bind(&event.details)
        .bind(event.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append audit event", e))
    }

    async fn find_by_resource(
        &self,
        resource_type: AuditResourceType,
        resource_id: Uuid,
    ) -> AppResult<Vec<AuditEvent>> {
        sqlx::query_as::<_, AuditEvent>(
            "SELECT * FROM audit_events WHERE resource_type = $1 AND resource_id = $2 \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(resource_type.as_str())
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list audit events", e))
    }
}
