//! Expired shared link sweep.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use bucketdrive_core::error::ErrorKind;
use bucketdrive_service::ShareLinkService;

use crate::executor::{JobExecutionError, JobHandler};

/// Marks expired shared links as revoked.
#[derive(Debug, Clone)]
pub struct LinkSweepJobHandler {
    shares: Arc<ShareLinkService>,
}

impl LinkSweepJobHandler {
    /// Create a new link sweep handler
    pub fn new(shares: Arc<ShareLinkService>) -> Self {
        Self { shares }
    }
}

#[async_trait]
impl JobHandler for LinkSweepJobHandler {
    fn job_type(&self) -> &str {
        "link_sweep"
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        let now = self.shares.now();
        tracing::debug!(%now, "Running shared link sweep");

        let count = self.shares.sweep_expired(now).await.map_err(|e| match e.kind {
            ErrorKind::Database | ErrorKind::ServiceUnavailable => {
                JobExecutionError::Transient(format!("Link sweep failed: {e}"))
            }
            _ => JobExecutionError::Internal(e),
        })?;

        Ok(serde_json::json!({
            "task": "link_sweep",
            "links_revoked": count,
        }))
    }
}
