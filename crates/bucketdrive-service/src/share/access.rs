//! Access evaluation for presented share tokens.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use bucketdrive_core::result::AppResult;
use bucketdrive_database::store::LinkStore;
use bucketdrive_entity::link::{AccessDecision, LinkRecord, LinkUpdate};

/// Upper bound on fetch/increment rounds for one presentation.
const MAX_ATTEMPTS: usize = 4;

/// A decision together with the record it was made on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessResolution {
    /// The record, when the token exists. On `Allow` this is the record
    /// after the access was counted.
    pub record: Option<LinkRecord>,
    /// The classification.
    pub decision: AccessDecision,
}

/// Decides whether a token grants access at a given instant.
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    links: Arc<dyn LinkStore>,
}

impl AccessEvaluator {
    /// Creates a new evaluator.
    pub fn new(links: Arc<dyn LinkStore>) -> Self {
        Self { links }
    }

    /// Classify `record` at `now` without touching the store.
    ///
    /// Checks run NOT_FOUND, EXPIRED, REVOKED, MAX_ACCESS_REACHED; the first
    /// that matches wins.
    pub fn classify(record: Option<&LinkRecord>, now: DateTime<Utc>) -> AccessDecision {
        let Some(record) = record else {
            return AccessDecision::NotFound;
        };
        if record.is_expired_at(now) {
            AccessDecision::Expired
        } else if record.is_revoked {
            AccessDecision::Revoked
        } else if record.is_exhausted() {
            AccessDecision::MaxAccessReached
        } else {
            AccessDecision::Allow
        }
    }

    /// What presenting `token` at `now` would yield. Read-only.
    pub async fn inspect(&self, token: &str, now: DateTime<Utc>) -> AppResult<AccessResolution> {
        let record = self.links.find_by_token(token).await?;
        let decision = Self::classify(record.as_ref(), now);
        Ok(AccessResolution { record, decision })
    }

    /// Evaluate a presentation of `token` at `now`.
    ///
    /// An `Allow` is only returned once the store has counted the access
    /// through its conditional update. When a concurrent writer wins the
    /// race, the record is fetched again and reclassified.
    pub async fn evaluate(&self, token: &str, now: DateTime<Utc>) -> AppResult<AccessResolution> {
        let mut last = None;

        for _ in 0..MAX_ATTEMPTS {
            let resolution = self.inspect(token, now).await?;
            let decision = resolution.decision;
            let record = match resolution.record {
                Some(record) if decision.is_allowed() => record,
                record => {
                    debug!(%decision, link_id = ?record.as_ref().map(|r| r.id), "Share access denied");
                    return Ok(AccessResolution { record, decision });
                }
            };

            let change = LinkUpdate::RecordAccess { accessed_at: now };
            if let Some(updated) = self.links.update(record.id, change).await? {
                debug!(
                    link_id = %updated.id,
                    access_count = updated.access_count,
                    "Share access granted"
                );
                return Ok(AccessResolution {
                    record: Some(updated),
                    decision: AccessDecision::Allow,
                });
            }
            last = Some(record);
        }

        debug!(link_id = ?last.as_ref().map(|r| r.id), "Share access lost every increment race");
        Ok(AccessResolution {
            record: last,
            decision: AccessDecision::MaxAccessReached,
        })
    }
}
