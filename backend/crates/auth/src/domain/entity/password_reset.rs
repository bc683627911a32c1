//! Password Reset Token Entity
//!
//! Single-use, expiring tokens for the password reset flow. Only the
//! SHA-256 hash of the token is stored; the plain token goes out
//! through the delivery channel once.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

/// Password reset token entity
#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    /// Token row ID
    pub token_id: Uuid,
    /// Owning user
    pub user_id: UserId,
    /// SHA-256 hash of the opaque token
    pub token_hash: Vec<u8>,
    /// Expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    /// Set when the token was consumed
    pub used_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Create a new reset token row
    pub fn new(user_id: UserId, token_hash: Vec<u8>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at_ms: (now + ttl).timestamp_millis(),
            used_at: None,
            created_at: now,
        }
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    /// Check if the token was already consumed
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Mark as consumed
    pub fn mark_used(&mut self) {
        self.used_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_valid() {
        let token = PasswordResetToken::new(UserId::new(), vec![1u8; 32], Duration::hours(1));
        assert!(!token.is_expired());
        assert!(!token.is_used());
    }

    #[test]
    fn test_single_use() {
        let mut token = PasswordResetToken::new(UserId::new(), vec![1u8; 32], Duration::hours(1));
        token.mark_used();
        assert!(token.is_used());
    }

    #[test]
    fn test_expiry() {
        let mut token = PasswordResetToken::new(UserId::new(), vec![1u8; 32], Duration::hours(1));
        token.expires_at_ms = Utc::now().timestamp_millis() - 1;
        assert!(token.is_expired());
    }
}
