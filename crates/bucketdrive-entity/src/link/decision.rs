//! Outcome of presenting a share token.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a token presentation.
///
/// Denials are checked in declaration order (after `Allow`): a token that is
/// both expired and revoked reports `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessDecision {
    /// Access granted and counted.
    Allow,
    /// No record carries this token.
    NotFound,
    /// The link is past its expiry instant.
    Expired,
    /// The link was revoked.
    Revoked,
    /// The access limit has been used up.
    MaxAccessReached,
}

impl AccessDecision {
    /// Whether this decision grants access.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::NotFound => "NOT_FOUND",
            Self::Expired => "EXPIRED",
            Self::Revoked => "REVOKED",
            Self::MaxAccessReached => "MAX_ACCESS_REACHED",
        }
    }

    /// Human-readable reason shown to the person holding the link.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Allow => "Access granted",
            Self::NotFound => "Share link not found",
            Self::Expired => "Share link has expired",
            Self::Revoked => "Share link has been revoked",
            Self::MaxAccessReached => "Share link has reached its access limit",
        }
    }

    /// HTTP status code for this decision. Unknown tokens are 404; links
    /// that existed but no longer grant access are 410.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Allow => 200,
            Self::NotFound => 404,
            Self::Expired | Self::Revoked | Self::MaxAccessReached => 410,
        }
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
