//! Shared link lifecycle: create, revoke, sweep, resolve.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use bucketdrive_auth::AuthorizationGate;
use bucketdrive_core::clock::Clock;
use bucketdrive_core::error::{AppError, ErrorKind};
use bucketdrive_core::result::AppResult;
use bucketdrive_database::store::{AuditStore, DirectoryStore, LinkStore};
use bucketdrive_entity::audit::{AuditAction, AuditEvent, AuditResourceType};
use bucketdrive_entity::link::{CreateLinkRecord, LinkRecord, LinkUpdate};

use super::access::{AccessEvaluator, AccessResolution};
use super::audit::AuditRecorder;
use super::token::TokenSource;
use crate::context::RequestContext;

/// Longest allowed link lifetime (one year).
pub const MAX_EXPIRES_IN_HOURS: i64 = 8760;

/// Largest allowed access limit.
pub const MAX_ACCESS_LIMIT: i64 = 10_000;

/// Request to share one object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLinkRequest {
    /// Bucket holding the object.
    pub bucket_name: String,
    /// Object key within the bucket.
    pub file_path: String,
    /// Display label. Defaults to the last path segment when blank.
    #[serde(default)]
    pub file_name: String,
    /// Lifetime in hours, within `(0, 8760]`.
    pub expires_in_hours: i64,
    /// Optional access limit, within `(0, 10000]`.
    #[serde(default)]
    pub max_access: Option<i64>,
    /// Optional annotation.
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateLinkRequest {
    fn validate(&self) -> AppResult<()> {
        if self.bucket_name.trim().is_empty() {
            return Err(AppError::validation("bucket_name is required"));
        }
        if self.file_path.trim().is_empty() {
            return Err(AppError::validation("file_path is required"));
        }
        if self.expires_in_hours <= 0 || self.expires_in_hours > MAX_EXPIRES_IN_HOURS {
            return Err(AppError::validation(format!(
                "expires_in_hours must be between 1 and {MAX_EXPIRES_IN_HOURS}"
            )));
        }
        if let Some(max) = self.max_access {
            if max <= 0 || max > MAX_ACCESS_LIMIT {
                return Err(AppError::validation(format!(
                    "max_access must be between 1 and {MAX_ACCESS_LIMIT}"
                )));
            }
        }
        Ok(())
    }

    fn display_name(&self) -> String {
        let trimmed = self.file_name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
        self.file_path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.file_path)
            .to_string()
    }
}

/// Owns the shared link invariants.
#[derive(Debug, Clone)]
pub struct ShareLinkService {
    links: Arc<dyn LinkStore>,
    directory: Arc<dyn DirectoryStore>,
    tokens: Arc<dyn TokenSource>,
    evaluator: AccessEvaluator,
    audit: AuditRecorder,
    gate: AuthorizationGate,
    clock: Arc<dyn Clock>,
}

impl ShareLinkService {
    /// Creates a new share link service.
    pub fn new(
        links: Arc<dyn LinkStore>,
        audit: Arc<dyn AuditStore>,
        directory: Arc<dyn DirectoryStore>,
        tokens: Arc<dyn TokenSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            evaluator: AccessEvaluator::new(links.clone()),
            audit: AuditRecorder::new(audit),
            gate: AuthorizationGate::new(),
            links,
            directory,
            tokens,
            clock,
        }
    }

    /// Creates a link for `(bucket_name, file_path)` owned by the caller.
    ///
    /// The caller needs `read` on the bucket unless they are an admin.
    pub async fn create_link(
        &self,
        ctx: &RequestContext,
        req: CreateLinkRequest,
    ) -> AppResult<LinkRecord> {
        req.validate()?;

        let snapshot = self.directory.snapshot(ctx.user_id, &req.bucket_name).await?;
        self.gate.require_create(&snapshot, &req.bucket_name)?;

        let created_at = self.clock.now();
        let mut data = CreateLinkRecord {
            token: self.tokens.generate()?,
            file_name: req.display_name(),
            bucket_name: req.bucket_name,
            file_path: req.file_path,
            created_by: ctx.user_id,
            created_at,
            expires_at: created_at + Duration::hours(req.expires_in_hours),
            max_access: req.max_access,
            description: req.description,
        };

        let record = match self.links.insert(&data).await {
            Err(e) if e.is(ErrorKind::Conflict) => {
                warn!(user_id = %ctx.user_id, "Share token collision, regenerating once");
                data.token = self.tokens.generate()?;
                self.links.insert(&data).await?
            }
            other => other?,
        };

        self.audit
            .record(
                Some(ctx.user_id),
                AuditAction::SharedLinkCreated,
                AuditResourceType::SharedLink,
                Some(record.id),
                Some(json!({
                    "bucket_name": record.bucket_name,
                    "file_path": record.file_path,
                    "expires_at": record.expires_at,
                    "max_access": record.max_access,
                })),
                created_at,
            )
            .await;

        info!(
            user_id = %ctx.user_id,
            link_id = %record.id,
            bucket = %record.bucket_name,
            path = %record.file_path,
            expires_at = %record.expires_at,
            "Shared link created"
        );

        Ok(record)
    }

    /// Revokes a link. Only the owner or an admin may do so, and only once.
    pub async fn revoke_link(&self, ctx: &RequestContext, link_id: Uuid) -> AppResult<LinkRecord> {
        let record = self
            .links
            .find_by_id(link_id)
            .await?
            .ok_or_else(|| AppError::not_found("Shared link not found"))?;

        if !self.gate.can_revoke_link(ctx.user_id, &record, ctx.is_admin()) {
            return Err(AppError::authorization(
                "Only the link owner or an administrator can revoke this link",
            ));
        }
        if record.is_revoked {
            return Err(AppError::already_revoked("Shared link is already revoked"));
        }

        let revoked_at = self.clock.now();
        let change = LinkUpdate::Revoke {
            revoked_by: ctx.user_id,
            revoked_at,
        };
        let revoked = self
            .links
            .update(link_id, change)
            .await?
            .ok_or_else(|| AppError::already_revoked("Shared link is already revoked"))?;

        self.audit
            .record(
                Some(ctx.user_id),
                AuditAction::SharedLinkRevoked,
                AuditResourceType::SharedLink,
                Some(link_id),
                Some(json!({ "owner": revoked.created_by })),
                revoked_at,
            )
            .await;

        info!(user_id = %ctx.user_id, link_id = %link_id, "Shared link revoked");
        Ok(revoked)
    }

    /// Marks every expired, unrevoked link as revoked. Idempotent.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let swept = self.links.sweep_expired(now).await?;
        if swept > 0 {
            self.audit
                .record(
                    None,
                    AuditAction::SharedLinksSwept,
                    AuditResourceType::SharedLink,
                    None,
                    Some(json!({ "count": swept })),
                    now,
                )
                .await;
            info!(count = swept, "Expired shared links swept");
        }
        Ok(swept)
    }

    /// Resolves `token` for a download, counting the access on `Allow`.
    pub async fn resolve_for_access(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<AccessResolution> {
        self.evaluator.evaluate(token, now).await
    }

    /// Link info for `token` with the decision a download would get now.
    /// Never counts an access.
    pub async fn link_info(&self, token: &str, now: DateTime<Utc>) -> AppResult<AccessResolution> {
        self.evaluator.inspect(token, now).await
    }

    /// Fetches one link by id. Owners and admins only.
    pub async fn get_link(&self, ctx: &RequestContext, link_id: Uuid) -> AppResult<LinkRecord> {
        let record = self
            .links
            .find_by_id(link_id)
            .await?
            .ok_or_else(|| AppError::not_found("Shared link not found"))?;

        if !self.gate.can_view_link(ctx.user_id, &record, ctx.is_admin()) {
            return Err(AppError::authorization("You can only view your own shared links"));
        }
        Ok(record)
    }

    /// Links created by the caller, newest first.
    pub async fn list_links(&self, ctx: &RequestContext) -> AppResult<Vec<LinkRecord>> {
        self.links.find_by_owner(ctx.user_id).await
    }

    /// Audit trail of one link. Admins only.
    pub async fn audit_trail(
        &self,
        ctx: &RequestContext,
        link_id: Uuid,
    ) -> AppResult<Vec<AuditEvent>> {
        if !ctx.is_admin() {
            return Err(AppError::authorization("Admin access required"));
        }
        self.audit
            .trail(AuditResourceType::SharedLink, link_id)
            .await
    }

    /// Current time according to the service clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bucketdrive_core::clock::ManualClock;
    use bucketdrive_database::memory::{MemoryAuditStore, MemoryDirectoryStore, MemoryLinkStore};
    use bucketdrive_entity::audit::CreateAuditEvent;
    use bucketdrive_entity::link::AccessDecision;
    use bucketdrive_entity::permission::PermissionSet;
    use bucketdrive_entity::user::{UserProfile, UserRole};

    use crate::share::token::TokenGenerator;

    struct Harness {
        service: Arc<ShareLinkService>,
        links: Arc<MemoryLinkStore>,
        audit: Arc<MemoryAuditStore>,
        clock: Arc<ManualClock>,
        owner: RequestContext,
        stranger: RequestContext,
        admin: RequestContext,
    }

    fn user(directory: &MemoryDirectoryStore, role: UserRole) -> RequestContext {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", Uuid::new_v4()),
            role,
            is_active: true,
        };
        directory.upsert_user(profile.clone());
        RequestContext::new(profile.id, profile.email, role)
    }

    fn harness_with(tokens: Arc<dyn TokenSource>, audit_store: Option<Arc<dyn AuditStore>>) -> Harness {
        let links = Arc::new(MemoryLinkStore::new());
        let audit = Arc::new(MemoryAuditStore::new());
        let directory = Arc::new(MemoryDirectoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));

        let owner = user(&directory, UserRole::User);
        let stranger = user(&directory, UserRole::User);
        let admin = user(&directory, UserRole::Admin);
        directory.grant(owner.user_id, "media", PermissionSet::read_only());

        let service = ShareLinkService::new(
            links.clone(),
            audit_store.unwrap_or_else(|| audit.clone() as Arc<dyn AuditStore>),
            directory,
            tokens,
            clock.clone(),
        );
        Harness {
            service: Arc::new(service),
            links,
            audit,
            clock,
            owner,
            stranger,
            admin,
        }
    }

    fn harness() -> Harness {
        harness_with(Arc::new(TokenGenerator::new()), None)
    }

    fn request(hours: i64, max_access: Option<i64>) -> CreateLinkRequest {
        CreateLinkRequest {
            bucket_name: "media".to_string(),
            file_path: "reports/q3.pdf".to_string(),
            file_name: String::new(),
            expires_in_hours: hours,
            max_access,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_sets_expiry_and_zero_count() {
        let h = harness();
        let record = h
            .service
            .create_link(&h.owner, request(24, Some(2)))
            .await
            .unwrap();

        assert_eq!(record.expires_at, record.created_at + Duration::hours(24));
        assert_eq!(record.created_at, h.clock.now());
        assert_eq!(record.access_count, 0);
        assert_eq!(record.file_name, "q3.pdf");
        assert_eq!(record.created_by, h.owner.user_id);

        let events = h.audit.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "shared_link_created");
        assert_eq!(events[0].resource_id, Some(record.id));
    }

    #[tokio::test]
    async fn test_expiry_bounds() {
        let h = harness();
        for hours in [0, -1, MAX_EXPIRES_IN_HOURS + 1] {
            let err = h
                .service
                .create_link(&h.owner, request(hours, None))
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "hours = {hours}");
        }
        assert!(
            h.service
                .create_link(&h.owner, request(MAX_EXPIRES_IN_HOURS, None))
                .await
                .is_ok()
        );
        assert!(h.links.len() == 1);
    }

    #[tokio::test]
    async fn test_max_access_bounds() {
        let h = harness();
        for max in [0, MAX_ACCESS_LIMIT + 1] {
            let err = h
                .service
                .create_link(&h.owner, request(1, Some(max)))
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation);
        }
        assert!(
            h.service
                .create_link(&h.owner, request(1, Some(MAX_ACCESS_LIMIT)))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_create_requires_read_permission() {
        let h = harness();
        let err = h
            .service
            .create_link(&h.stranger, request(1, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        assert!(h.service.create_link(&h.admin, request(1, None)).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_then_exhaust() {
        let h = harness();
        let record = h
            .service
            .create_link(&h.owner, request(24, Some(2)))
            .await
            .unwrap();
        let now = h.clock.now();

        let first = h.service.resolve_for_access(&record.token, now).await.unwrap();
        assert_eq!(first.decision, AccessDecision::Allow);
        assert_eq!(first.record.unwrap().access_count, 1);

        let second = h.service.resolve_for_access(&record.token, now).await.unwrap();
        assert_eq!(second.decision, AccessDecision::Allow);
        assert_eq!(second.record.unwrap().access_count, 2);

        let third = h.service.resolve_for_access(&record.token, now).await.unwrap();
        assert_eq!(third.decision, AccessDecision::MaxAccessReached);
    }

    #[tokio::test]
    async fn test_expired_after_clock_advance() {
        let h = harness();
        let record = h.service.create_link(&h.owner, request(1, None)).await.unwrap();
        h.clock.advance(Duration::hours(2));

        let resolution = h
            .service
            .resolve_for_access(&record.token, h.clock.now())
            .await
            .unwrap();
        assert_eq!(resolution.decision, AccessDecision::Expired);
        assert_eq!(resolution.record.unwrap().access_count, 0);
    }

    #[tokio::test]
    async fn test_revoke_then_access() {
        let h = harness();
        let record = h.service.create_link(&h.owner, request(24, None)).await.unwrap();

        let revoked = h.service.revoke_link(&h.owner, record.id).await.unwrap();
        assert!(revoked.is_revoked);
        assert_eq!(revoked.revoked_by, Some(h.owner.user_id));
        assert_eq!(revoked.revoked_at, Some(h.clock.now()));

        let resolution = h
            .service
            .resolve_for_access(&record.token, h.clock.now())
            .await
            .unwrap();
        assert_eq!(resolution.decision, AccessDecision::Revoked);

        let actions: Vec<String> = h.audit.events().await.into_iter().map(|e| e.action).collect();
        assert_eq!(actions, vec!["shared_link_created", "shared_link_revoked"]);
    }

    #[tokio::test]
    async fn test_expired_and_revoked_reports_expired() {
        let h = harness();
        let record = h.service.create_link(&h.owner, request(1, None)).await.unwrap();
        h.service.revoke_link(&h.owner, record.id).await.unwrap();
        h.clock.advance(Duration::hours(3));

        let resolution = h
            .service
            .resolve_for_access(&record.token, h.clock.now())
            .await
            .unwrap();
        assert_eq!(resolution.decision, AccessDecision::Expired);
    }

    #[tokio::test]
    async fn test_revoke_permissions_and_idempotency() {
        let h = harness();
        let record = h.service.create_link(&h.owner, request(24, None)).await.unwrap();

        let err = h.service.revoke_link(&h.stranger, record.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        h.service.revoke_link(&h.admin, record.id).await.unwrap();
        let err = h.service.revoke_link(&h.owner, record.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyRevoked);

        let err = h.service.revoke_link(&h.owner, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access_respects_limit() {
        let h = harness();
        let limit = 5;
        let record = h
            .service
            .create_link(&h.owner, request(24, Some(limit)))
            .await
            .unwrap();
        let now = h.clock.now();

        let tasks: Vec<_> = (0..40)
            .map(|_| {
                let service = h.service.clone();
                let token = record.token.clone();
                tokio::spawn(async move { service.resolve_for_access(&token, now).await })
            })
            .collect();

        let mut allowed = 0;
        let mut exhausted = 0;
        for result in futures::future::join_all(tasks).await {
            match result.unwrap().unwrap().decision {
                AccessDecision::Allow => allowed += 1,
                AccessDecision::MaxAccessReached => exhausted += 1,
                other => panic!("unexpected decision {other}"),
            }
        }
        assert_eq!(allowed, limit);
        assert_eq!(exhausted, 40 - limit);

        let stored = h.links.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.access_count, limit);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_revoke_exactly_once() {
        let h = harness();
        let record = h.service.create_link(&h.owner, request(24, None)).await.unwrap();

        let a = {
            let service = h.service.clone();
            let ctx = h.owner.clone();
            tokio::spawn(async move { service.revoke_link(&ctx, record.id).await })
        };
        let b = {
            let service = h.service.clone();
            let ctx = h.admin.clone();
            tokio::spawn(async move { service.revoke_link(&ctx, record.id).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let already = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.kind == ErrorKind::AlreadyRevoked))
            .count();
        assert_eq!((ok, already), (1, 1));
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent_and_audited() {
        let h = harness();
        let short = h.service.create_link(&h.owner, request(1, None)).await.unwrap();
        let long = h.service.create_link(&h.owner, request(48, None)).await.unwrap();
        h.clock.advance(Duration::hours(2));
        let now = h.clock.now();

        assert_eq!(h.service.sweep_expired(now).await.unwrap(), 1);
        let after_first = h.links.find_by_id(short.id).await.unwrap().unwrap();
        assert!(after_first.is_revoked);
        assert_eq!(after_first.revoked_by, None);

        assert_eq!(h.service.sweep_expired(now).await.unwrap(), 0);
        let after_second = h.links.find_by_id(short.id).await.unwrap().unwrap();
        assert_eq!(after_first, after_second);
        assert!(!h.links.find_by_id(long.id).await.unwrap().unwrap().is_revoked);

        let sweeps: Vec<_> = h
            .audit
            .events()
            .await
            .into_iter()
            .filter(|e| e.action == "shared_links_swept")
            .collect();
        assert_eq!(sweeps.len(), 1);
        assert_eq!(sweeps[0].actor_id, None);
        assert_eq!(sweeps[0].details, Some(json!({ "count": 1 })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sweep_races_access_on_expired_link() {
        let h = harness();
        let record = h.service.create_link(&h.owner, request(1, Some(3))).await.unwrap();
        h.clock.advance(Duration::hours(2));
        let now = h.clock.now();

        let accesses: Vec<_> = (0..30)
            .map(|_| {
                let service = h.service.clone();
                let token = record.token.clone();
                tokio::spawn(async move { service.resolve_for_access(&token, now).await })
            })
            .collect();
        let sweeps: Vec<_> = (0..4)
            .map(|_| {
                let service = h.service.clone();
                tokio::spawn(async move { service.sweep_expired(now).await })
            })
            .collect();

        for result in futures::future::join_all(accesses).await {
            assert_eq!(result.unwrap().unwrap().decision, AccessDecision::Expired);
        }
        let mut counts: Vec<u64> = futures::future::join_all(sweeps)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();
        counts.sort_unstable();
        assert_eq!(counts, vec![0, 0, 0, 1]);

        let stored = h.links.find_by_id(record.id).await.unwrap().unwrap();
        assert!(stored.is_revoked);
        assert_eq!(stored.access_count, 0);
        assert_eq!(stored.last_accessed_at, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sweep_leaves_live_link_counting() {
        let h = harness();
        let limit = 4;
        let record = h
            .service
            .create_link(&h.owner, request(24, Some(limit)))
            .await
            .unwrap();
        let now = h.clock.now();

        let accesses: Vec<_> = (0..20)
            .map(|_| {
                let service = h.service.clone();
                let token = record.token.clone();
                tokio::spawn(async move { service.resolve_for_access(&token, now).await })
            })
            .collect();
        let sweeps: Vec<_> = (0..4)
            .map(|_| {
                let service = h.service.clone();
                tokio::spawn(async move { service.sweep_expired(now).await })
            })
            .collect();

        let allowed = futures::future::join_all(accesses)
            .await
            .into_iter()
            .filter(|r| r.as_ref().unwrap().as_ref().unwrap().decision.is_allowed())
            .count();
        for result in futures::future::join_all(sweeps).await {
            assert_eq!(result.unwrap().unwrap(), 0);
        }

        assert_eq!(allowed, limit as usize);
        let stored = h.links.find_by_id(record.id).await.unwrap().unwrap();
        assert!(!stored.is_revoked);
        assert_eq!(stored.access_count, limit);
    }

    #[tokio::test]
    async fn test_link_info_has_no_side_effects() {
        let h = harness();
        let record = h.service.create_link(&h.owner, request(1, Some(1))).await.unwrap();
        let now = h.clock.now();

        for _ in 0..3 {
            let info = h.service.link_info(&record.token, now).await.unwrap();
            assert_eq!(info.decision, AccessDecision::Allow);
            assert_eq!(info.record.unwrap().access_count, 0);
        }
    }

    #[tokio::test]
    async fn test_get_and_list_are_owner_scoped() {
        let h = harness();
        let first = h.service.create_link(&h.owner, request(1, None)).await.unwrap();
        h.clock.advance(Duration::minutes(1));
        let second = h.service.create_link(&h.owner, request(1, None)).await.unwrap();

        let listed: Vec<Uuid> = h
            .service
            .list_links(&h.owner)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, vec![second.id, first.id]);
        assert!(h.service.list_links(&h.stranger).await.unwrap().is_empty());

        assert!(h.service.get_link(&h.owner, first.id).await.is_ok());
        assert!(h.service.get_link(&h.admin, first.id).await.is_ok());
        let err = h.service.get_link(&h.stranger, first.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_audit_trail_admin_only() {
        let h = harness();
        let record = h.service.create_link(&h.owner, request(1, None)).await.unwrap();

        let err = h.service.audit_trail(&h.owner, record.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let trail = h.service.audit_trail(&h.admin, record.id).await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].actor_id, Some(h.owner.user_id));
    }

    #[derive(Debug, Default)]
    struct ScriptedTokens {
        queue: Mutex<Vec<String>>,
    }

    impl ScriptedTokens {
        fn new(tokens: &[&str]) -> Self {
            Self {
                queue: Mutex::new(tokens.iter().rev().map(|t| t.to_string()).collect()),
            }
        }
    }

    impl TokenSource for ScriptedTokens {
        fn generate(&self) -> AppResult<String> {
            self.queue
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| AppError::internal("out of tokens"))
        }
    }

    #[tokio::test]
    async fn test_collision_regenerates_once() {
        let h = harness_with(Arc::new(ScriptedTokens::new(&["aa", "aa", "bb"])), None);
        let first = h.service.create_link(&h.owner, request(1, None)).await.unwrap();
        let second = h.service.create_link(&h.owner, request(1, None)).await.unwrap();
        assert_eq!(first.token, "aa");
        assert_eq!(second.token, "bb");
    }

    #[tokio::test]
    async fn test_second_collision_fails() {
        let h = harness_with(Arc::new(ScriptedTokens::new(&["aa", "aa", "aa"])), None);
        h.service.create_link(&h.owner, request(1, None)).await.unwrap();
        let err = h
            .service
            .create_link(&h.owner, request(1, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(h.links.len(), 1);
    }

    #[tokio::test]
    async fn test_entropy_failure_aborts_creation() {
        let h = harness_with(Arc::new(ScriptedTokens::new(&[])), None);
        let err = h
            .service
            .create_link(&h.owner, request(1, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(h.links.is_empty());
    }

    #[derive(Debug)]
    struct BrokenAudit;

    #[async_trait]
    impl AuditStore for BrokenAudit {
        async fn append(&self, _event: &CreateAuditEvent) -> AppResult<AuditEvent> {
            Err(AppError::database("audit table unavailable"))
        }

        async fn find_by_resource(
            &self,
            _resource_type: AuditResourceType,
            _resource_id: Uuid,
        ) -> AppResult<Vec<AuditEvent>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_block() {
        let h = harness_with(Arc::new(TokenGenerator::new()), Some(Arc::new(BrokenAudit)));
        let record = h.service.create_link(&h.owner, request(1, None)).await.unwrap();
        let revoked = h.service.revoke_link(&h.owner, record.id).await.unwrap();
        assert!(revoked.is_revoked);
    }
}
