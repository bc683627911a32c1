//! Login History Entity
//!
//! Append-only record of sign-in attempts, successful and failed.
//! The user binding is optional so attempts against unknown
//! identifiers are recorded too.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

/// Why a sign-in attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailureReason {
    InvalidCredentials,
    AccountLocked,
    AccountDisabled,
    InvalidTwoFactorCode,
}

impl LoginFailureReason {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::AccountLocked => "account_locked",
            Self::AccountDisabled => "account_disabled",
            Self::InvalidTwoFactorCode => "invalid_2fa_code",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "invalid_credentials" => Some(Self::InvalidCredentials),
            "account_locked" => Some(Self::AccountLocked),
            "account_disabled" => Some(Self::AccountDisabled),
            "invalid_2fa_code" => Some(Self::InvalidTwoFactorCode),
            _ => None,
        }
    }
}

/// One sign-in attempt
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    /// Row ID
    pub attempt_id: Uuid,
    /// Matched user, if the identifier resolved
    pub user_id: Option<UserId>,
    /// The identifier the client presented (user name or email)
    pub identifier: String,
    /// Whether the attempt succeeded
    pub success: bool,
    /// Failure reason for unsuccessful attempts
    pub failure_reason: Option<LoginFailureReason>,
    /// Client IP
    pub client_ip: Option<String>,
    /// User agent
    pub user_agent: Option<String>,
    /// Attempt timestamp
    pub created_at: DateTime<Utc>,
}

impl LoginAttempt {
    /// Record a successful attempt
    pub fn success(
        user_id: UserId,
        identifier: impl Into<String>,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            user_id: Some(user_id),
            identifier: identifier.into(),
            success: true,
            failure_reason: None,
            client_ip,
            user_agent,
            created_at: Utc::now(),
        }
    }

    /// Record a failed attempt
    pub fn failure(
        user_id: Option<UserId>,
        identifier: impl Into<String>,
        reason: LoginFailureReason,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            user_id,
            identifier: identifier.into(),
            success: false,
            failure_reason: Some(reason),
            client_ip,
            user_agent,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_attempt() {
        let attempt = LoginAttempt::success(UserId::new(), "alice", None, None);
        assert!(attempt.success);
        assert!(attempt.failure_reason.is_none());
        assert!(attempt.user_id.is_some());
    }

    #[test]
    fn test_failure_attempt_without_user() {
        let attempt = LoginAttempt::failure(
            None,
            "ghost@example.com",
            LoginFailureReason::InvalidCredentials,
            None,
            None,
        );
        assert!(!attempt.success);
        assert!(attempt.user_id.is_none());
        assert_eq!(
            attempt.failure_reason,
            Some(LoginFailureReason::InvalidCredentials)
        );
    }

    #[test]
    fn test_failure_reason_codes() {
        for reason in [
            LoginFailureReason::InvalidCredentials,
            LoginFailureReason::AccountLocked,
            LoginFailureReason::AccountDisabled,
            LoginFailureReason::InvalidTwoFactorCode,
        ] {
            assert_eq!(LoginFailureReason::from_code(reason.code()), Some(reason));
        }
        assert_eq!(LoginFailureReason::from_code("other"), None);
    }
}
