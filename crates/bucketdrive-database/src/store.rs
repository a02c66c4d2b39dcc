//! Store traits consumed by the service layer.
//!
//! Every mutation is durable before the call returns, and every
//! conditional mutation is a single atomic step at the store. Callers never
//! perform read-then-write pairs to change a record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use bucketdrive_core::result::AppResult;
use bucketdrive_entity::audit::{AuditEvent, AuditResourceType, CreateAuditEvent};
use bucketdrive_entity::link::{CreateLinkRecord, LinkRecord, LinkUpdate};
use bucketdrive_entity::permission::{PermissionSet, PermissionSnapshot};
use bucketdrive_entity::user::UserProfile;

/// Durable CRUD over link records.
#[async_trait]
pub trait LinkStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new record. Fails with `Conflict` when the token is taken.
    async fn insert(&self, data: &CreateLinkRecord) -> AppResult<LinkRecord>;

    /// Look a record up by token, regardless of its revoked/expired state.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<LinkRecord>>;

    /// Look a record up by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<LinkRecord>>;

    /// All records owned by `user_id`, newest first.
    async fn find_by_owner(&self, user_id: Uuid) -> AppResult<Vec<LinkRecord>>;

    /// Apply `change` if its guard holds. Returns the updated record, or
    /// `None` when the record is missing or the guard did not hold.
    async fn update(&self, id: Uuid, change: LinkUpdate) -> AppResult<Option<LinkRecord>>;

    /// Mark every unrevoked record with `expires_at < now` as revoked.
    /// Returns the number of records changed.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Append-only audit event storage.
#[async_trait]
pub trait AuditStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append an event.
    async fn append(&self, event: &CreateAuditEvent) -> AppResult<AuditEvent>;

    /// Events about one resource, oldest first.
    async fn find_by_resource(
        &self,
        resource_type: AuditResourceType,
        resource_id: Uuid,
    ) -> AppResult<Vec<AuditEvent>>;
}

/// User directory and per-bucket permission lookups.
#[async_trait]
pub trait DirectoryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user profile.
    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;

    /// Permissions `user_id` holds on `bucket`, or `None` without access.
    async fn bucket_permissions(
        &self,
        user_id: Uuid,
        bucket: &str,
    ) -> AppResult<Option<PermissionSet>>;

    /// Whether `user_id` is an administrator. Unknown users are not.
    async fn is_admin(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self
            .find_user(user_id)
            .await?
            .is_some_and(|user| user.is_admin()))
    }

    /// Permission data for one bucket, shaped for the authorization gate.
    async fn snapshot(&self, user_id: Uuid, bucket: &str) -> AppResult<PermissionSnapshot> {
        let mut snapshot = PermissionSnapshot::new(user_id, self.is_admin(user_id).await?);
        if let Some(permissions) = self.bucket_permissions(user_id, bucket).await? {
            snapshot.buckets.insert(bucket.to_string(), permissions);
        }
        Ok(snapshot)
    }
}
