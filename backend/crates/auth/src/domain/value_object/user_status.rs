//! User Status Value Object
//!
//! Account status is intentionally kept to three states. Suspension
//! details (why, until when) belong to moderation tooling, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User account status
///
/// - **Active**: normal, fully functional account
/// - **Disabled**: cannot sign in (admin action or abuse lockdown)
/// - **Memorial**: preserved permanently, cannot sign in or be modified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum UserStatus {
    #[default]
    Active = 0,
    Disabled = 1,
    Memorial = 2,
}

impl UserStatus {
    /// Get numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    /// Get string code for serialization/API
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::Memorial => "memorial",
        }
    }

    /// Check if login is allowed
    #[inline]
    pub const fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Check if account can be modified
    #[inline]
    pub const fn can_modify(&self) -> bool {
        matches!(self, Self::Active | Self::Disabled)
    }

    /// Check if this is a terminal state (cannot transition out)
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Memorial)
    }

    /// Create from numeric ID
    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Active),
            1 => Some(Self::Disabled),
            2 => Some(Self::Memorial),
            _ => None,
        }
    }

    /// Create from string code
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "active" => Some(Self::Active),
            "disabled" => Some(Self::Disabled),
            "memorial" => Some(Self::Memorial),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [UserStatus::Active, UserStatus::Disabled, UserStatus::Memorial] {
            assert_eq!(UserStatus::from_id(status.id()), Some(status));
            assert_eq!(UserStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(UserStatus::from_id(99), None);
        assert_eq!(UserStatus::from_code("deleted"), None);
    }

    #[test]
    fn test_can_login() {
        assert!(UserStatus::Active.can_login());
        assert!(!UserStatus::Disabled.can_login());
        assert!(!UserStatus::Memorial.can_login());
    }

    #[test]
    fn test_terminal() {
        assert!(!UserStatus::Active.is_terminal());
        assert!(UserStatus::Memorial.is_terminal());
        assert!(!UserStatus::Memorial.can_modify());
    }
}
