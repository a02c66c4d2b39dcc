//! In-memory link store using dashmap.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use uuid::Uuid;

use bucketdrive_core::error::AppError;
use bucketdrive_core::result::AppResult;
use bucketdrive_entity::link::{CreateLinkRecord, LinkRecord, LinkUpdate};

use crate::store::LinkStore;

/// In-memory link store.
///
/// Each record lives behind its shard's write lock while a conditional
/// update runs, so guard check and mutation happen as one step. The token
/// index is claimed through the entry API, which makes token uniqueness
/// atomic as well.
#[derive(Debug, Clone, Default)]
pub struct MemoryLinkStore {
    records: Arc<DashMap<Uuid, LinkRecord>>,
    tokens: Arc<DashMap<String, Uuid>>,
}

impl MemoryLinkStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn insert(&self, data: &CreateLinkRecord) -> AppResult<LinkRecord> {
        match self.tokens.entry(data.token.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict("Share token already exists")),
            Entry::Vacant(slot) => {
                let record = LinkRecord {
                    id: Uuid::new_v4(),
                    token: data.token.clone(),
                    bucket_name: data.bucket_name.clone(),
                    file_path: data.file_path.clone(),
                    file_name: data.file_name.clone(),
                    created_by: data.created_by,
                    created_at: data.created_at,
                    expires_at: data.expires_at,
                    is_revoked: false,
                    revoked_at: None,
                    revoked_by: None,
                    access_count: 0,
                    max_access: data.max_access,
                    last_accessed_at: None,
                    description: data.description.clone(),
                };
                self.records.insert(record.id, record.clone());
                slot.insert(record.id);
                Ok(record)
            }
        }
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<LinkRecord>> {
        let Some(id) = self.tokens.get(token).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<LinkRecord>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_owner(&self, user_id: Uuid) -> AppResult<Vec<LinkRecord>> {
        let mut owned: Vec<LinkRecord> = self
            .records
            .iter()
            .filter(|entry| entry.created_by == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn update(&self, id: Uuid, change: LinkUpdate) -> AppResult<Option<LinkRecord>> {
        let Some(mut entry) = self.records.get_mut(&id) else {
            return Ok(None);
        };
        if !change.applies_to(&entry) {
            debug!(link_id = %id, ?change, "Conditional update rejected");
            return Ok(None);
        }
        change.apply(&mut entry);
        Ok(Some(entry.value().clone()))
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut swept = 0u64;
        for mut entry in self.records.iter_mut() {
            if !entry.is_revoked && entry.expires_at < now {
                entry.is_revoked = true;
                entry.revoked_at = Some(now);
                swept += 1;
            }
        }
        Ok(swept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_link(token: &str, owner: Uuid, created_at: DateTime<Utc>) -> CreateLinkRecord {
        CreateLinkRecord {
            token: token.to_string(),
            bucket_name: "media".to_string(),
            file_path: "videos/launch.mp4".to_string(),
            file_name: "launch.mp4".to_string(),
            created_by: owner,
            created_at,
            expires_at: created_at + Duration::hours(1),
            max_access: Some(1),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_token_conflicts() {
        let store = MemoryLinkStore::new();
        let owner = Uuid::new_v4();
        store
            .insert(&new_link("abc", owner, Utc::now()))
            .await
            .unwrap();
        let err = store
            .insert(&new_link("abc", owner, Utc::now()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, bucketdrive_core::error::ErrorKind::Conflict);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_owner_newest_first() {
        let store = MemoryLinkStore::new();
        let owner = Uuid::new_v4();
        let base = Utc::now();
        store.insert(&new_link("old", owner, base)).await.unwrap();
        store
            .insert(&new_link("new", owner, base + Duration::minutes(5)))
            .await
            .unwrap();
        store
            .insert(&new_link("other", Uuid::new_v4(), base))
            .await
            .unwrap();

        let owned = store.find_by_owner(owner).await.unwrap();
        let tokens: Vec<&str> = owned.iter().map(|r| r.token.as_str()).collect();
        assert_eq!(tokens, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_record_access_stops_at_limit() {
        let store = MemoryLinkStore::new();
        let now = Utc::now();
        let record = store
            .insert(&new_link("once", Uuid::new_v4(), now))
            .await
            .unwrap();
        let change = LinkUpdate::RecordAccess { accessed_at: now };

        let first = store.update(record.id, change).await.unwrap();
        assert_eq!(first.map(|r| r.access_count), Some(1));
        assert!(store.update(record.id, change).await.unwrap().is_none());
        let stored = store.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.access_count, 1);
    }

    #[tokio::test]
    async fn test_sweep_marks_only_expired_unrevoked() {
        let store = MemoryLinkStore::new();
        let now = Utc::now();
        let expired = store
            .insert(&new_link("expired", Uuid::new_v4(), now - Duration::hours(3)))
            .await
            .unwrap();
        let live = store
            .insert(&new_link("live", Uuid::new_v4(), now))
            .await
            .unwrap();

        assert_eq!(store.sweep_expired(now).await.unwrap(), 1);
        assert_eq!(store.sweep_expired(now).await.unwrap(), 0);

        let expired = store.find_by_id(expired.id).await.unwrap().unwrap();
        assert!(expired.is_revoked);
        assert_eq!(expired.revoked_at, Some(now));
        assert_eq!(expired.revoked_by, None);
        assert!(!store.find_by_id(live.id).await.unwrap().unwrap().is_revoked);
    }
}
