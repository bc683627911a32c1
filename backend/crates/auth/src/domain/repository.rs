//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{
    auth::Auth, auth_session::AuthSession, backup_code::BackupCode, login_history::LoginAttempt,
    password_reset::PasswordResetToken, refresh_token::RefreshToken, user::User,
    user_details::UserDetails,
};
use crate::domain::value_object::{
    email::Email, public_id::PublicId, user_id::UserId, user_name::UserName,
};
use crate::error::AuthResult;
use uuid::Uuid;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by public ID
    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>>;

    /// Find user by user name
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Find user by contact email (joins user details)
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if user name exists
    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;

    /// Update user
    async fn update(&self, user: &User) -> AuthResult<()>;
}

/// User details repository trait
#[trait_variant::make(UserDetailsRepository: Send)]
pub trait LocalUserDetailsRepository {
    /// Create user details
    async fn create(&self, details: &UserDetails) -> AuthResult<()>;

    /// Find details by user ID
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<UserDetails>>;

    /// Update user details
    async fn update(&self, details: &UserDetails) -> AuthResult<()>;

    /// Check if email exists
    async fn exists_by_email(&self, email: &str) -> AuthResult<bool>;
}

/// Auth credentials repository trait
#[trait_variant::make(AuthRepository: Send)]
pub trait LocalAuthRepository {
    /// Create auth credentials
    async fn create(&self, auth: &Auth) -> AuthResult<()>;

    /// Find auth by user ID
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>>;

    /// Update auth credentials
    async fn update(&self, auth: &Auth) -> AuthResult<()>;
}

/// Auth session repository trait
#[trait_variant::make(AuthSessionRepository: Send)]
pub trait LocalAuthSessionRepository {
    /// Create a new session
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    /// Find session by ID and verify fingerprint
    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>>;

    /// Find all active sessions for a user
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Vec<AuthSession>>;

    /// Update session (e.g., last activity)
    async fn update(&self, session: &AuthSession) -> AuthResult<()>;

    /// Delete a session
    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    /// Delete all sessions for a user (optionally keeping one)
    async fn delete_all_for_user(&self, user_id: &UserId, except: Option<Uuid>) -> AuthResult<u64>;

    /// Clean up expired sessions
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Refresh token repository trait
#[trait_variant::make(RefreshTokenRepository: Send)]
pub trait LocalRefreshTokenRepository {
    /// Store a new refresh token row
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Find a token by the hash of its opaque value
    async fn find_by_hash(&self, token_hash: &[u8]) -> AuthResult<Option<RefreshToken>>;

    /// Mark a token as rotated out
    async fn mark_used(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Revoke every token in a family
    async fn revoke_family(&self, family_id: Uuid) -> AuthResult<u64>;

    /// Revoke every token belonging to a user
    async fn revoke_all_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    /// Clean up expired and long-revoked tokens
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Backup code repository trait
#[trait_variant::make(BackupCodeRepository: Send)]
pub trait LocalBackupCodeRepository {
    /// Replace the user's batch with freshly generated codes
    async fn replace_all(&self, user_id: &UserId, codes: &[BackupCode]) -> AuthResult<()>;

    /// Consume an unused code matching the hash. Returns false when no
    /// matching unused code exists.
    async fn consume(&self, user_id: &UserId, code_hash: &[u8]) -> AuthResult<bool>;

    /// Count remaining unused codes
    async fn count_remaining(&self, user_id: &UserId) -> AuthResult<u32>;

    /// Delete all codes for a user (on 2FA disable)
    async fn delete_all(&self, user_id: &UserId) -> AuthResult<u64>;
}

/// Password reset token repository trait
#[trait_variant::make(PasswordResetRepository: Send)]
pub trait LocalPasswordResetRepository {
    /// Store a new reset token row
    async fn create(&self, token: &PasswordResetToken) -> AuthResult<()>;

    /// Find a token by the hash of its opaque value
    async fn find_by_hash(&self, token_hash: &[u8]) -> AuthResult<Option<PasswordResetToken>>;

    /// Mark a token as consumed
    async fn mark_used(&self, token: &PasswordResetToken) -> AuthResult<()>;

    /// Clean up expired tokens
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Login history repository trait
#[trait_variant::make(LoginHistoryRepository: Send)]
pub trait LocalLoginHistoryRepository {
    /// Append an attempt record
    async fn record(&self, attempt: &LoginAttempt) -> AuthResult<()>;

    /// List the most recent attempts for a user, newest first
    async fn list_recent(&self, user_id: &UserId, limit: u32) -> AuthResult<Vec<LoginAttempt>>;
}
