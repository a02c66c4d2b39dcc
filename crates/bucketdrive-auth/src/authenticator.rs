//! Resolves bearer credentials to active directory users.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use bucketdrive_core::error::AppError;
use bucketdrive_database::store::DirectoryStore;
use bucketdrive_entity::user::UserRole;

use crate::jwt::JwtDecoder;

/// Identity of a verified caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    /// Stable user identifier.
    pub user_id: Uuid,
    /// Email address.
    pub email: String,
    /// Whether the account is active (always `true` once authenticated).
    pub is_active: bool,
    /// Current role from the directory.
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Whether the caller is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Verifies bearer tokens against the signing key and the user directory.
#[derive(Debug, Clone)]
pub struct Authenticator {
    decoder: JwtDecoder,
    directory: Arc<dyn DirectoryStore>,
}

impl Authenticator {
    /// Creates a new authenticator.
    pub fn new(decoder: JwtDecoder, directory: Arc<dyn DirectoryStore>) -> Self {
        Self { decoder, directory }
    }

    /// Verify `token` and load the caller from the directory.
    ///
    /// Unknown and deactivated users fail with `Authentication`, as does any
    /// signature or expiry problem. The role is read from the directory, not
    /// from the token, so demotions take effect immediately.
    pub async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let claims = self.decoder.decode_access_token(token)?;

        let user = self
            .directory
            .find_user(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;

        if !user.is_active {
            debug!(user_id = %user.id, "Rejected token for deactivated user");
            return Err(AppError::authentication("User account is disabled"));
        }

        Ok(AuthenticatedUser {
            user_id: user.id,
            email: user.email,
            is_active: user.is_active,
            role: user.role,
        })
    }
}
