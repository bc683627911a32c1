//! Password Reset Use Case
//!
//! Request produces a single-use, expiring token; confirm consumes it,
//! sets the new password and cuts every live session and refresh token.
//! Delivery of the token (mail) is out of scope for this layer.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::password_reset::PasswordResetToken;
use crate::domain::repository::{
    AuthRepository, AuthSessionRepository, PasswordResetRepository, RefreshTokenRepository,
    UserRepository,
};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};
use platform::crypto::{hash_token, random_token};

/// Byte length of the opaque reset token material
const RESET_TOKEN_BYTES: usize = 32;

/// Successful reset request (internal - never exposed over HTTP)
pub struct ResetRequestOutput {
    /// The plain token to hand to the delivery channel
    pub reset_token: String,
    /// Public ID of the matched user
    pub public_id: String,
    /// Email the token should be delivered to
    pub email: String,
}

/// Password reset use case
pub struct PasswordResetUseCase<U, A, S, R, P>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
    R: RefreshTokenRepository,
    P: PasswordResetRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    session_repo: Arc<S>,
    refresh_repo: Arc<R>,
    reset_repo: Arc<P>,
    config: Arc<AuthConfig>,
}

impl<U, A, S, R, P> PasswordResetUseCase<U, A, S, R, P>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
    R: RefreshTokenRepository,
    P: PasswordResetRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        auth_repo: Arc<A>,
        session_repo: Arc<S>,
        refresh_repo: Arc<R>,
        reset_repo: Arc<P>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            auth_repo,
            session_repo,
            refresh_repo,
            reset_repo,
            config,
        }
    }

    /// Request a reset token for the account behind `email`
    ///
    /// Returns `Ok(None)` when no account matches - the HTTP layer
    /// answers identically either way to prevent account enumeration.
    pub async fn request(&self, email: &str) -> AuthResult<Option<ResetRequestOutput>> {
        let email = match Email::new(email) {
            Ok(email) => email,
            Err(_) => return Ok(None),
        };

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            return Ok(None);
        };

        if !user.can_login() {
            return Ok(None);
        }

        let ttl = chrono::Duration::from_std(self.config.reset_token_ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid reset TTL: {e}")))?;

        let opaque = random_token(RESET_TOKEN_BYTES);
        let row = PasswordResetToken::new(
            user.user_id.clone(),
            hash_token(&opaque).to_vec(),
            ttl,
        );
        self.reset_repo.create(&row).await?;

        tracing::info!(
            public_id = %user.public_id,
            "Password reset requested"
        );

        Ok(Some(ResetRequestOutput {
            reset_token: opaque,
            public_id: user.public_id.to_string(),
            email: email.into_db(),
        }))
    }

    /// Consume a reset token and set the new password
    ///
    /// On success the lockout state is cleared and every session and
    /// refresh token of the user is revoked.
    pub async fn confirm(&self, reset_token: &str, new_password: String) -> AuthResult<()> {
        let token_hash = hash_token(reset_token);

        let stored = self
            .reset_repo
            .find_by_hash(&token_hash)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        if stored.is_used() {
            return Err(AuthError::InvalidResetToken);
        }

        if stored.is_expired() {
            return Err(AuthError::ResetTokenExpired);
        }

        let raw_password = RawPassword::new(new_password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let mut auth = self
            .auth_repo
            .find_by_user_id(&stored.user_id)
            .await?
            .ok_or(AuthError::Internal("Auth not found".to_string()))?;

        auth.update_password(password_hash);
        auth.reset_failures();
        self.auth_repo.update(&auth).await?;

        // Single-use: consume before cutting sessions so a concurrent
        // confirm with the same token fails the is_used check
        let mut stored = stored;
        stored.mark_used();
        self.reset_repo.mark_used(&stored).await?;

        let sessions_deleted = self
            .session_repo
            .delete_all_for_user(&stored.user_id, None)
            .await?;
        let tokens_revoked = self
            .refresh_repo
            .revoke_all_for_user(&stored.user_id)
            .await?;

        tracing::info!(
            user_id = %stored.user_id,
            sessions_deleted = sessions_deleted,
            tokens_revoked = tokens_revoked,
            "Password reset completed"
        );

        Ok(())
    }
}
