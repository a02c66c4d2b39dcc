//! Best-effort audit recording.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use bucketdrive_core::result::AppResult;
use bucketdrive_database::store::AuditStore;
use bucketdrive_entity::audit::{AuditAction, AuditEvent, AuditResourceType, CreateAuditEvent};

/// Appends audit events without ever failing the caller.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    /// Creates a new recorder.
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Append an event. A failed write is logged and dropped.
    pub async fn record(
        &self,
        actor_id: Option<Uuid>,
        action: AuditAction,
        resource_type: AuditResourceType,
        resource_id: Option<Uuid>,
        details: Option<Value>,
        at: DateTime<Utc>,
    ) {
        let event = CreateAuditEvent {
            actor_id,
            action,
            resource_type,
            resource_id,
            details,
            created_at: at,
        };

        if let Err(e) = self.store.append(&event).await {
            warn!(
                %action,
                resource_type = %resource_type.as_str(),
                resource_id = ?resource_id,
                error = %e,
                "Failed to write audit event"
            );
        }
    }

    /// Events about one resource, oldest first.
    pub async fn trail(
        &self,
        resource_type: AuditResourceType,
        resource_id: Uuid,
    ) -> AppResult<Vec<AuditEvent>> {
        self.store.find_by_resource(resource_type, resource_id).await
    }
}
