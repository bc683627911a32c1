//! Sign In Use Case
//!
//! Authenticates a user and creates a session. Every attempt lands in
//! the login history, including ones against unknown identifiers.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_token::sign_session_token;
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::entity::backup_code::hash_code;
use crate::domain::entity::login_history::{LoginAttempt, LoginFailureReason};
use crate::domain::entity::user::User;
use crate::domain::repository::{
    AuthRepository, AuthSessionRepository, BackupCodeRepository, LoginHistoryRepository,
    UserRepository,
};
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    /// User name or email
    pub identifier: String,
    /// Password
    pub password: String,
    /// Remember me flag
    pub remember_me: bool,
    /// TOTP code (if 2FA is enabled)
    pub totp_code: Option<String>,
    /// Backup code as a 2FA fallback
    pub backup_code: Option<String>,
}

/// Sign in output
pub struct SignInOutput {
    /// Session token for cookie (empty when 2FA is still pending)
    pub session_token: String,
    /// Whether 2FA is required
    pub requires_2fa: bool,
    /// Public ID
    pub public_id: String,
    /// Internal user ID, present after full authentication
    pub user_id: Option<UserId>,
}

/// Re-export ClientFingerprint from platform
pub use platform::client::ClientFingerprint;

/// Sign in use case
pub struct SignInUseCase<U, A, S, B, H>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
    B: BackupCodeRepository,
    H: LoginHistoryRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    session_repo: Arc<S>,
    backup_repo: Arc<B>,
    history_repo: Arc<H>,
    config: Arc<AuthConfig>,
}

impl<U, A, S, B, H> SignInUseCase<U, A, S, B, H>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
    B: BackupCodeRepository,
    H: LoginHistoryRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        auth_repo: Arc<A>,
        session_repo: Arc<S>,
        backup_repo: Arc<B>,
        history_repo: Arc<H>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            auth_repo,
            session_repo,
            backup_repo,
            history_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: SignInInput,
        fingerprint: ClientFingerprint,
    ) -> AuthResult<SignInOutput> {
        let identifier = input.identifier.clone();

        let user = self.resolve_user(&input.identifier).await?;

        let Some(user) = user else {
            self.record_failure(None, &identifier, LoginFailureReason::InvalidCredentials, &fingerprint)
                .await;
            return Err(AuthError::InvalidCredentials);
        };

        // Check if user can login at all
        if !user.can_login() {
            self.record_failure(
                Some(user.user_id.clone()),
                &identifier,
                LoginFailureReason::AccountDisabled,
                &fingerprint,
            )
            .await;
            return Err(AuthError::AccountDisabled);
        }

        // Get auth credentials
        let mut auth = self
            .auth_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or(AuthError::Internal("Auth not found".to_string()))?;

        // Check if account is locked
        if auth.is_locked() {
            self.record_failure(
                Some(user.user_id.clone()),
                &identifier,
                LoginFailureReason::AccountLocked,
                &fingerprint,
            )
            .await;
            return Err(AuthError::AccountLocked);
        }

        // Verify password
        let raw_password = RawPassword::new(input.password)
            .map_err(|_| AuthError::InvalidCredentials)?;

        if !auth.password_hash.verify(&raw_password, self.config.pepper()) {
            auth.record_failure();
            self.auth_repo.update(&auth).await?;
            self.record_failure(
                Some(user.user_id.clone()),
                &identifier,
                LoginFailureReason::InvalidCredentials,
                &fingerprint,
            )
            .await;
            return Err(AuthError::InvalidCredentials);
        }

        // Check if 2FA is required
        if user.requires_2fa() || auth.requires_2fa() {
            if !auth.totp_enabled {
                // User needs to set up 2FA first
                return Err(AuthError::TwoFactorNotSetup);
            }

            match (&input.totp_code, &input.backup_code) {
                (None, None) => {
                    // 2FA required but no second factor provided
                    return Ok(SignInOutput {
                        session_token: String::new(),
                        requires_2fa: true,
                        public_id: user.public_id.to_string(),
                        user_id: None,
                    });
                }
                (Some(code), _) => {
                    let totp_secret = auth
                        .totp_secret
                        .as_ref()
                        .ok_or(AuthError::TwoFactorNotSetup)?;

                    let valid = totp_secret
                        .verify(code, user.user_name.as_str())
                        .map_err(|e| AuthError::Internal(e.to_string()))?;

                    if !valid {
                        self.record_failure(
                            Some(user.user_id.clone()),
                            &identifier,
                            LoginFailureReason::InvalidTwoFactorCode,
                            &fingerprint,
                        )
                        .await;
                        return Err(AuthError::InvalidTwoFactorCode);
                    }
                }
                (None, Some(code)) => {
                    let consumed = self
                        .backup_repo
                        .consume(&user.user_id, &hash_code(code))
                        .await?;

                    if !consumed {
                        self.record_failure(
                            Some(user.user_id.clone()),
                            &identifier,
                            LoginFailureReason::InvalidTwoFactorCode,
                            &fingerprint,
                        )
                        .await;
                        return Err(AuthError::InvalidTwoFactorCode);
                    }

                    let remaining = self.backup_repo.count_remaining(&user.user_id).await?;
                    tracing::info!(
                        public_id = %user.public_id,
                        remaining = remaining,
                        "Backup code consumed for sign-in"
                    );
                }
            }
        }

        // Reset failure count, rehash if the stored hash is outdated
        auth.reset_failures();
        if auth.password_hash.needs_rehash() {
            use crate::domain::value_object::user_password::UserPassword;
            let rehashed = UserPassword::from_raw(&raw_password, self.config.pepper())
                .map_err(|e| AuthError::Internal(e.to_string()))?;
            auth.update_password(rehashed);
        }
        self.auth_repo.update(&auth).await?;

        // Update user's last login
        let mut user = user;
        user.record_login();
        self.user_repo.update(&user).await?;

        // Record the successful attempt
        let attempt = LoginAttempt::success(
            user.user_id.clone(),
            &identifier,
            fingerprint.ip_string(),
            fingerprint.user_agent.clone(),
        );
        if let Err(e) = self.history_repo.record(&attempt).await {
            tracing::warn!(error = %e, "Failed to record login attempt");
        }

        // Create session
        let ttl = if input.remember_me {
            self.config.session_ttl_long
        } else {
            self.config.session_ttl_short
        };
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))?;

        let session = AuthSession::new(
            user.user_id.clone(),
            user.public_id,
            user.user_role,
            input.remember_me,
            fingerprint.hash_vec(),
            fingerprint.ip_string(),
            fingerprint.user_agent.clone(),
            ttl,
        );

        self.session_repo.create(&session).await?;

        let session_token = sign_session_token(&self.config.session_secret, session.session_id);

        tracing::info!(
            public_id = %user.public_id,
            session_id = %session.session_id,
            remember_me = input.remember_me,
            "User signed in"
        );

        Ok(SignInOutput {
            session_token,
            requires_2fa: false,
            public_id: user.public_id.to_string(),
            user_id: Some(user.user_id),
        })
    }

    /// Resolve the identifier to a user: email when it contains `@`,
    /// user name otherwise
    async fn resolve_user(&self, identifier: &str) -> AuthResult<Option<User>> {
        if identifier.contains('@') {
            let email = match Email::new(identifier) {
                Ok(email) => email,
                Err(_) => return Ok(None),
            };
            self.user_repo.find_by_email(&email).await
        } else {
            let user_name = match UserName::new(identifier) {
                Ok(name) => name,
                Err(_) => return Ok(None),
            };
            self.user_repo.find_by_user_name(&user_name).await
        }
    }

    async fn record_failure(
        &self,
        user_id: Option<UserId>,
        identifier: &str,
        reason: LoginFailureReason,
        fingerprint: &ClientFingerprint,
    ) {
        let attempt = LoginAttempt::failure(
            user_id,
            identifier,
            reason,
            fingerprint.ip_string(),
            fingerprint.user_agent.clone(),
        );
        if let Err(e) = self.history_repo.record(&attempt).await {
            tracing::warn!(error = %e, "Failed to record login attempt");
        }
    }
}
