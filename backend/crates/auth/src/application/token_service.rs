//! Token Service
//!
//! Issues short-lived JWT access tokens paired with opaque, single-use
//! refresh tokens. Refresh rotates the opaque token inside a family;
//! presenting a rotated-out token revokes the whole family.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::application::config::AuthConfig;
use crate::domain::entity::refresh_token::RefreshToken;
use crate::domain::entity::user::User;
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};
use platform::client::ClientFingerprint;
use platform::crypto::{hash_token, random_token};

/// Byte length of the opaque refresh token material
const REFRESH_TOKEN_BYTES: usize = 32;

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (internal user ID as UUID string)
    pub sub: String,
    /// Public ID for API responses
    pub pid: String,
    /// Role code at issuance
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Token pair returned after authentication or refresh
pub struct TokenPairOutput {
    /// JWT access token (short-lived)
    pub access_token: String,
    /// Access token validity in seconds
    pub access_expires_in: i64,
    /// Opaque refresh token (single-use)
    pub refresh_token: String,
}

/// Token service
pub struct TokenService<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    refresh_repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<U, R> TokenService<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    pub fn new(user_repo: Arc<U>, refresh_repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            refresh_repo,
            config,
        }
    }

    /// Issue a fresh token pair for a fully authenticated user
    ///
    /// Callers must have completed credential and 2FA checks first.
    pub async fn issue(
        &self,
        user_id: &UserId,
        fingerprint: &ClientFingerprint,
    ) -> AuthResult<TokenPairOutput> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let refresh_ttl = chrono::Duration::from_std(self.config.refresh_token_ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid refresh TTL: {e}")))?;

        let opaque = random_token(REFRESH_TOKEN_BYTES);
        let row = RefreshToken::new_family(
            user.user_id.clone(),
            hash_token(&opaque).to_vec(),
            refresh_ttl,
            fingerprint.ip_string(),
            fingerprint.user_agent.clone(),
        );
        self.refresh_repo.create(&row).await?;

        let access_token = self.encode_access_token(&user)?;

        tracing::info!(
            public_id = %user.public_id,
            family_id = %row.family_id,
            "Token pair issued"
        );

        Ok(TokenPairOutput {
            access_token,
            access_expires_in: self.config.access_token_ttl_secs(),
            refresh_token: opaque,
        })
    }

    /// Exchange a refresh token for a new pair, rotating it
    ///
    /// A rotated-out or revoked token revokes the whole family before
    /// the request is rejected.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        fingerprint: &ClientFingerprint,
    ) -> AuthResult<TokenPairOutput> {
        let token_hash = hash_token(refresh_token);

        let stored = self
            .refresh_repo
            .find_by_hash(&token_hash)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if stored.is_used() || stored.is_revoked() {
            // Reuse of a consumed token means the opaque value leaked;
            // every descendant of this grant is now suspect.
            let revoked = self.refresh_repo.revoke_family(stored.family_id).await?;
            tracing::warn!(
                user_id = %stored.user_id,
                family_id = %stored.family_id,
                revoked = revoked,
                "Refresh token reuse detected"
            );
            return Err(AuthError::RefreshTokenReuse);
        }

        if stored.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        let user = self
            .user_repo
            .find_by_id(&stored.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.can_login() {
            self.refresh_repo.revoke_family(stored.family_id).await?;
            return Err(AuthError::AccountDisabled);
        }

        // Rotate: consume the presented token, mint a successor in the
        // same family
        self.refresh_repo.mark_used(&stored).await?;

        let refresh_ttl = chrono::Duration::from_std(self.config.refresh_token_ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid refresh TTL: {e}")))?;

        let opaque = random_token(REFRESH_TOKEN_BYTES);
        let successor = RefreshToken::in_family(
            user.user_id.clone(),
            stored.family_id,
            hash_token(&opaque).to_vec(),
            refresh_ttl,
            fingerprint.ip_string(),
            fingerprint.user_agent.clone(),
        );
        self.refresh_repo.create(&successor).await?;

        let access_token = self.encode_access_token(&user)?;

        tracing::info!(
            public_id = %user.public_id,
            family_id = %stored.family_id,
            "Token pair refreshed"
        );

        Ok(TokenPairOutput {
            access_token,
            access_expires_in: self.config.access_token_ttl_secs(),
            refresh_token: opaque,
        })
    }

    /// Revoke the family of the presented refresh token (API logout)
    pub async fn revoke(&self, refresh_token: &str) -> AuthResult<()> {
        let token_hash = hash_token(refresh_token);

        let stored = self
            .refresh_repo
            .find_by_hash(&token_hash)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let revoked = self.refresh_repo.revoke_family(stored.family_id).await?;

        tracing::info!(
            user_id = %stored.user_id,
            family_id = %stored.family_id,
            revoked = revoked,
            "Refresh token family revoked"
        );

        Ok(())
    }

    /// Revoke every refresh token for a user (password reset, admin action)
    pub async fn revoke_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        self.refresh_repo.revoke_all_for_user(user_id).await
    }

    fn encode_access_token(&self, user: &User) -> AuthResult<String> {
        let now = Utc::now();
        let ttl = Duration::seconds(self.config.access_token_ttl_secs());

        let claims = AccessClaims {
            sub: user.user_id.as_uuid().to_string(),
            pid: user.public_id.to_string(),
            role: user.user_role.code().to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.config.token_secret),
        )
        .map_err(|e| AuthError::Internal(format!("Failed to encode access token: {e}")))
    }
}

/// Validate an access token against the signing secret
pub fn validate_access_token(token: &str, secret: &[u8; 32]) -> AuthResult<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_role::UserRole;

    fn encode_for_test(secret: &[u8; 32], exp_offset: i64) -> String {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: uuid::Uuid::new_v4().to_string(),
            pid: "0123456789abcdefghi01".to_string(),
            role: UserRole::User.code().to_string(),
            exp: (now + Duration::seconds(exp_offset)).timestamp(),
            iat: now.timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_roundtrip() {
        let secret = [9u8; 32];
        let token = encode_for_test(&secret, 900);
        let claims = validate_access_token(&token, &secret).unwrap();
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = encode_for_test(&[1u8; 32], 900);
        let err = validate_access_token(&token, &[2u8; 32]).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = [9u8; 32];
        let token = encode_for_test(&secret, -60);
        let err = validate_access_token(&token, &secret).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn test_garbage_rejected() {
        let err = validate_access_token("not.a.jwt", &[9u8; 32]).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
