//! Backup Code Use Case
//!
//! Regeneration and status of 2FA backup codes. Consumption happens
//! inside the sign-in flow.

use std::sync::Arc;

use crate::domain::entity::backup_code::generate_backup_codes;
use crate::domain::repository::{AuthRepository, BackupCodeRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Backup code use case
pub struct BackupCodeUseCase<U, A, B>
where
    U: UserRepository,
    A: AuthRepository,
    B: BackupCodeRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    backup_repo: Arc<B>,
}

impl<U, A, B> BackupCodeUseCase<U, A, B>
where
    U: UserRepository,
    A: AuthRepository,
    B: BackupCodeRepository,
{
    pub fn new(user_repo: Arc<U>, auth_repo: Arc<A>, backup_repo: Arc<B>) -> Self {
        Self {
            user_repo,
            auth_repo,
            backup_repo,
        }
    }

    /// Regenerate the batch, invalidating all previous codes
    ///
    /// Requires a valid current TOTP code so a hijacked session cannot
    /// silently mint recovery codes.
    pub async fn regenerate(&self, user_id: &UserId, totp_code: &str) -> AuthResult<Vec<String>> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let auth = self
            .auth_repo
            .find_by_user_id(user_id)
            .await?
            .ok_or(AuthError::Internal("Auth not found".to_string()))?;

        if !auth.totp_enabled {
            return Err(AuthError::TwoFactorNotSetup);
        }

        let secret = auth.totp_secret.as_ref().ok_or(AuthError::TwoFactorNotSetup)?;

        let valid = secret
            .verify(totp_code, user.user_name.as_str())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidTwoFactorCode);
        }

        let generated = generate_backup_codes(user_id);
        self.backup_repo.replace_all(user_id, &generated.codes).await?;

        tracing::info!(
            user_id = %user_id,
            "Backup codes regenerated"
        );

        Ok(generated.plain_codes)
    }

    /// Count remaining unused codes
    pub async fn remaining(&self, user_id: &UserId) -> AuthResult<u32> {
        self.backup_repo.count_remaining(user_id).await
    }
}
