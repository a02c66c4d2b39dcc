//! Shared test helpers for the HTTP integration tests.
//!
//! Builds the full router over in-memory stores so the tests run without
//! PostgreSQL or S3.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use bucketdrive_api::AppState;
use bucketdrive_auth::{Authenticator, JwtDecoder, JwtEncoder};
use bucketdrive_core::clock::{Clock, ManualClock};
use bucketdrive_core::config::AppConfig;
use bucketdrive_database::memory::{MemoryAuditStore, MemoryDirectoryStore, MemoryLinkStore};
use bucketdrive_entity::permission::PermissionSet;
use bucketdrive_entity::user::{UserProfile, UserRole};
use bucketdrive_service::{ShareLinkService, SharedDownloadService, TokenGenerator};
use bucketdrive_storage::MemoryObjectStore;

/// Public origin the test config hands out in share URLs.
pub const PUBLIC_BASE_URL: &str = "https://drive.test";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Directory users and grants
    pub directory: Arc<MemoryDirectoryStore>,
    /// Object contents served by downloads
    pub objects: MemoryObjectStore,
    /// Clock driving link expiry
    pub clock: Arc<ManualClock>,
    /// Application config
    pub config: AppConfig,
}

/// A parsed test response
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers
    pub headers: axum::http::HeaderMap,
    /// Raw body
    pub bytes: Vec<u8>,
    /// Body parsed as JSON (`Value::Null` when not JSON)
    pub body: Value,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "database": { "url": "postgres://unused/bucketdrive" },
            "auth": { "jwt_secret": "integration-test-secret" },
            "storage": { "provider": "memory" },
            "share": { "public_base_url": PUBLIC_BASE_URL },
            "worker": { "enabled": false },
        }))
        .expect("Failed to build test config");

        let directory = Arc::new(MemoryDirectoryStore::new());
        let objects = MemoryObjectStore::new();
        let clock = Arc::new(ManualClock::new(Utc::now()));

        let shares = Arc::new(ShareLinkService::new(
            Arc::new(MemoryLinkStore::new()),
            Arc::new(MemoryAuditStore::new()),
            directory.clone(),
            Arc::new(TokenGenerator::new()),
            clock.clone() as Arc<dyn Clock>,
        ));
        let downloads = Arc::new(SharedDownloadService::new(
            shares.clone(),
            Arc::new(objects.clone()),
        ));
        let authenticator = Arc::new(Authenticator::new(
            JwtDecoder::new(&config.auth),
            directory.clone(),
        ));

        let state = AppState {
            config: Arc::new(config.clone()),
            db_pool: None,
            authenticator,
            share_service: shares,
            download_service: downloads,
        };

        Self {
            router: bucketdrive_api::build_app(state),
            directory,
            objects,
            clock,
            config,
        }
    }

    /// Create an active user and return a bearer token for them
    pub fn create_user(&self, email: &str, role: UserRole) -> (Uuid, String) {
        let user = UserProfile {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role,
            is_active: true,
        };
        self.directory.upsert_user(user.clone());

        let (token, _) = JwtEncoder::new(&self.config.auth)
            .generate_access_token(&user, Utc::now())
            .expect("Failed to issue token");
        (user.id, token)
    }

    /// Grant `read` on `bucket`
    pub fn grant_read(&self, user_id: Uuid, bucket: &str) {
        self.directory
            .grant(user_id, bucket, PermissionSet::read_only());
    }

    /// Make an HTTP request against the router
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }

    /// Create a link over the API and return `(id, token)`
    pub async fn create_link(
        &self,
        bearer: &str,
        bucket: &str,
        path: &str,
        max_access: Option<i64>,
    ) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/api/shares",
                Some(serde_json::json!({
                    "bucket_name": bucket,
                    "file_path": path,
                    "expires_in_hours": 1,
                    "max_access": max_access,
                })),
                Some(bearer),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "create failed: {}",
            response.body
        );

        let link = &response.body["data"]["link"];
        (
            link["id"].as_str().expect("id").to_string(),
            link["token"].as_str().expect("token").to_string(),
        )
    }
}
