//! In-memory append-only audit log.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use bucketdrive_core::result::AppResult;
use bucketdrive_entity::audit::{AuditEvent, AuditResourceType, CreateAuditEvent};

use crate::store::AuditStore;

/// In-memory audit log.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditStore {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl MemoryAuditStore {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event appended so far, oldest first.
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, event: &CreateAuditEvent) -> AppResult<AuditEvent> {
        let stored = AuditEvent {
            id: Uuid::new_v4(),
            actor_id: event.actor_id,
            action: event.action.as_str().to_string(),
            resource_type: event.resource_type.as_str().to_string(),
            resource_id: event.resource_id,
            details: event.details.clone(),
            created_at: event.created_at,
        };
        self.events.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_resource(
        &self,
        resource_type: AuditResourceType,
        resource_id: Uuid,
    ) -> AppResult<Vec<AuditEvent>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| {
                e.resource_type == resource_type.as_str() && e.resource_id == Some(resource_id)
            })
            .cloned()
            .collect())
    }
}
