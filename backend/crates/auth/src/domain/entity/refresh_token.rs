//! Refresh Token Entity
//!
//! Opaque, single-use refresh tokens for API clients. Only the SHA-256
//! hash of the token is stored. Rotation keeps the family ID stable so
//! that reuse of a rotated-out token can revoke every descendant.

use chrono::{DateTime, Duration, Utc};
use kernel::id::RefreshTokenId;
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

/// Refresh token entity
#[derive(Debug, Clone)]
pub struct RefreshToken {
    /// Token row ID
    pub token_id: RefreshTokenId,
    /// Owning user
    pub user_id: UserId,
    /// Rotation family. Stable across rotations of the same grant.
    pub family_id: Uuid,
    /// SHA-256 hash of the opaque token
    pub token_hash: Vec<u8>,
    /// Expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    /// Set when the token was rotated out
    pub used_at: Option<DateTime<Utc>>,
    /// Set when the token (or its family) was revoked
    pub revoked_at: Option<DateTime<Utc>>,
    /// Client IP at issuance
    pub client_ip: Option<String>,
    /// User agent at issuance
    pub user_agent: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Create the first token of a new family
    pub fn new_family(
        user_id: UserId,
        token_hash: Vec<u8>,
        ttl: Duration,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self::in_family(user_id, Uuid::new_v4(), token_hash, ttl, client_ip, user_agent)
    }

    /// Create a rotation successor inside an existing family
    pub fn in_family(
        user_id: UserId,
        family_id: Uuid,
        token_hash: Vec<u8>,
        ttl: Duration,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            token_id: RefreshTokenId::new(),
            user_id,
            family_id,
            token_hash,
            expires_at_ms: (now + ttl).timestamp_millis(),
            used_at: None,
            revoked_at: None,
            client_ip,
            user_agent,
            created_at: now,
        }
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    /// Check if the token was rotated out
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Check if the token was revoked
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Check if the token can still be exchanged
    pub fn is_active(&self) -> bool {
        !self.is_used() && !self.is_revoked() && !self.is_expired()
    }

    /// Mark as rotated out
    pub fn mark_used(&mut self) {
        self.used_at = Some(Utc::now());
    }

    /// Mark as revoked
    pub fn revoke(&mut self) {
        self.revoked_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_token() -> RefreshToken {
        RefreshToken::new_family(
            UserId::new(),
            vec![1u8; 32],
            Duration::days(30),
            None,
            Some("test-agent".to_string()),
        )
    }

    #[test]
    fn test_new_token_is_active() {
        let token = test_token();
        assert!(token.is_active());
        assert!(!token.is_used());
        assert!(!token.is_revoked());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_used_token_not_active() {
        let mut token = test_token();
        token.mark_used();
        assert!(token.is_used());
        assert!(!token.is_active());
    }

    #[test]
    fn test_revoked_token_not_active() {
        let mut token = test_token();
        token.revoke();
        assert!(token.is_revoked());
        assert!(!token.is_active());
    }

    #[test]
    fn test_expired_token_not_active() {
        let mut token = test_token();
        token.expires_at_ms = Utc::now().timestamp_millis() - 1;
        assert!(token.is_expired());
        assert!(!token.is_active());
    }

    #[test]
    fn test_rotation_keeps_family() {
        let first = test_token();
        let next = RefreshToken::in_family(
            first.user_id.clone(),
            first.family_id,
            vec![2u8; 32],
            Duration::days(30),
            None,
            None,
        );
        assert_eq!(next.family_id, first.family_id);
        assert_ne!(next.token_id, first.token_id);
        assert_ne!(next.token_hash, first.token_hash);
    }
}
