//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use bucketdrive_auth::Authenticator;
use bucketdrive_core::config::AppConfig;
use bucketdrive_database::DatabasePool;
use bucketdrive_service::{ShareLinkService, SharedDownloadService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// PostgreSQL pool, absent when running on in-memory stores
    pub db_pool: Option<DatabasePool>,
    /// Bearer token verification
    pub authenticator: Arc<Authenticator>,
    /// Shared link lifecycle
    pub share_service: Arc<ShareLinkService>,
    /// Token-gated object downloads
    pub download_service: Arc<SharedDownloadService>,
}
