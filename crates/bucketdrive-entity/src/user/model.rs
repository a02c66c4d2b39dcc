//! User profile as seen by the shared link subsystem.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// Directory entry for an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    /// Stable user identifier.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Flat role.
    pub role: UserRole,
    /// Whether the account may sign in.
    pub is_active: bool,
}

impl UserProfile {
    /// Whether the user is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
